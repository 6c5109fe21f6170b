#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    response::Response,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use vocab_srs::{Card, SqliteVocabularyStore, http_api};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap()
}

fn new_router() -> axum::Router {
    let store = SqliteVocabularyStore::in_memory().unwrap();
    let state = http_api::AppState::new(store).with_clock(fixed_now);
    http_api::router(state)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &axum::Router, email: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/learners",
            &json!({ "email": email, "full_name": "Test Learner" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await["id"].as_i64().unwrap()
}

async fn add_word(app: &axum::Router, learner: i64, word: &str, meaning: &str) -> Card {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/learners/{learner}/vocabulary"),
            &json!({ "word": word, "meaning": meaning }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    serde_json::from_value(read_json(response).await).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = new_router();
    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], json!("ok"));
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let app = new_router();
    register(&app, "thu@example.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/learners",
            &json!({ "email": "THU@example.com", "full_name": "Again" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["error"], json!("conflict"));
}

#[tokio::test]
async fn review_flow_via_http_api() {
    let app = new_router();
    let learner = register(&app, "khoa@example.com").await;
    let card = add_word(&app, learner, "고양이", "con mèo").await;
    assert_eq!(card.level, 1);

    // The new card is due immediately
    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/learners/{learner}/review")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let queue = read_json(response).await;
    assert_eq!(queue["card"]["id"], json!(card.id));
    assert_eq!(queue["remaining_count"], json!(0));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/learners/{learner}/review"),
            &json!({ "word_id": card.id, "result": "Correct" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["new_level"], json!(2));
    assert_eq!(body["next_review_date"], json!("2025-07-04"));
    assert_eq!(body["message"], json!("New level: 2. Next review on: 2025-07-04"));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/learners/{learner}/review"),
            &json!({ "word_id": card.id, "result": "incorrect" }),
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["new_level"], json!(1));
    assert_eq!(body["next_review_date"], json!("2025-07-02"));

    // Nothing left to review today
    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/learners/{learner}/review")))
        .await
        .unwrap();
    let queue = read_json(response).await;
    assert_eq!(queue["card"], Value::Null);

    let response = app
        .oneshot(empty_request("GET", &format!("/learners/{learner}/dashboard")))
        .await
        .unwrap();
    let dashboard = read_json(response).await;
    assert_eq!(dashboard["total_words"], json!(1));
    assert_eq!(dashboard["words_to_review_count"], json!(0));
    assert_eq!(dashboard["learner_name"], json!("Test Learner"));
}

#[tokio::test]
async fn ambiguous_result_is_rejected_and_card_untouched() {
    let app = new_router();
    let learner = register(&app, "vy@example.com").await;
    let card = add_word(&app, learner, "개", "con chó").await;

    for payload in [
        json!({ "word_id": card.id, "result": "maybe" }),
        json!({ "word_id": card.id }),
        json!({ "result": "correct" }),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/learners/{learner}/review"),
                &payload,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(read_json(response).await["error"], json!("invalid_request"));
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/learners/{learner}/review"))
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/learners/{learner}/vocabulary/{}", card.id),
        ))
        .await
        .unwrap();
    let stored: Card = serde_json::from_value(read_json(response).await).unwrap();
    assert_eq!(stored.level, 1);
    assert_eq!(stored.last_reviewed_at, None);
}

#[tokio::test]
async fn review_of_foreign_card_is_not_found() {
    let app = new_router();
    let owner = register(&app, "owner@example.com").await;
    let intruder = register(&app, "intruder@example.com").await;
    let card = add_word(&app, owner, "새", "con chim").await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/learners/{intruder}/review"),
            &json!({ "word_id": card.id, "result": "correct" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], json!("not_found"));
}

#[tokio::test]
async fn vocabulary_edit_and_delete() {
    let app = new_router();
    let learner = register(&app, "linh@example.com").await;
    let card = add_word(&app, learner, "나무", "cay").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/learners/{learner}/vocabulary/{}", card.id),
            &json!({ "word": "나무", "meaning": "cây", "hanja": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let edited: Card = serde_json::from_value(read_json(response).await).unwrap();
    assert_eq!(edited.meaning, "cây");
    assert_eq!(edited.hanja, None);
    assert_eq!(edited.next_review_date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/learners/{learner}/vocabulary"),
            &json!({ "word": "", "meaning": "nothing" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/learners/{learner}/vocabulary/{}", card.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", &format!("/learners/{learner}/vocabulary")))
        .await
        .unwrap();
    assert_eq!(read_json(response).await, json!([]));
}

#[tokio::test]
async fn unknown_learner_is_not_found() {
    let app = new_router();
    for uri in ["/learners/42", "/learners/42/vocabulary", "/learners/42/review", "/learners/42/dashboard"] {
        let response = app.clone().oneshot(empty_request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

fn raw_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn rejected_bodies_and_paths_use_json_errors() {
    let app = new_router();
    let learner = register(&app, "bao@example.com").await;
    let vocabulary_uri = format!("/learners/{learner}/vocabulary");

    let cases = [
        raw_request("POST", "/learners", "{not json"),
        json_request("POST", "/learners", &json!({ "email": "a@b.c" })),
        empty_request("GET", "/learners/abc"),
        empty_request("GET", &format!("/learners/{learner}/vocabulary/xyz")),
        json_request("POST", &vocabulary_uri, &json!({ "word": 1 })),
        Request::builder()
            .method("POST")
            .uri(&vocabulary_uri)
            .body(Body::from(r#"{"word":"물","meaning":"nước"}"#))
            .unwrap(),
    ];
    for request in cases {
        let target = format!("{} {}", request.method(), request.uri());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{target}");
        let body = read_json(response).await;
        assert_eq!(body["error"], json!("invalid_request"), "{target}");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()), "{target}");
    }

    let response = app
        .oneshot(empty_request("GET", &vocabulary_uri))
        .await
        .unwrap();
    assert_eq!(read_json(response).await, json!([]));
}
