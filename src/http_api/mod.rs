use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    Card, CardId, Dashboard, Learner, LearnerId, NewLearner, NewVocabulary, ReviewOutcome,
    ReviewQueue, ReviewSummary, SqliteVocabularyStore, StoreError, VocabularyEdit,
    VocabularyStore,
};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    store: Arc<SqliteVocabularyStore>,
    clock: Clock,
}

impl AppState {
    pub fn new(store: SqliteVocabularyStore) -> Self {
        Self::with_shared(Arc::new(store))
    }

    pub fn with_shared(store: Arc<SqliteVocabularyStore>) -> Self {
        Self {
            store,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock, e.g. to pin "today" in tests.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    fn store(&self) -> &SqliteVocabularyStore {
        &self.store
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn require_learner(&self, id: LearnerId) -> Result<Learner, ApiError> {
        self.store()
            .learner(id)?
            .ok_or_else(|| ApiError::not_found(format!("learner {id} not found")))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(message) => ApiError::NotFound(message),
            StoreError::Conflict(message) => ApiError::Conflict(message),
            StoreError::InvalidData(message) => ApiError::Invalid(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::Invalid(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        ApiError::Invalid(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                warn!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct ReviewPayload {
    #[serde(default)]
    word_id: Option<CardId>,
    #[serde(default)]
    result: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub new_level: u8,
    pub next_review_date: NaiveDate,
    pub message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/learners", post(register_learner))
        .route("/learners/:learner_id", get(get_learner))
        .route("/learners/:learner_id/dashboard", get(get_dashboard))
        .route(
            "/learners/:learner_id/vocabulary",
            get(list_vocabulary).post(add_vocabulary),
        )
        .route(
            "/learners/:learner_id/vocabulary/:card_id",
            get(get_vocabulary)
                .put(edit_vocabulary)
                .delete(delete_vocabulary),
        )
        .route(
            "/learners/:learner_id/review",
            get(next_review).post(check_word),
        )
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, store: SqliteVocabularyStore) -> std::io::Result<()> {
    let state = AppState::new(store);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "vocab-srs HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn register_learner(
    State(state): State<AppState>,
    payload: Result<Json<NewLearner>, JsonRejection>,
) -> Result<(StatusCode, Json<Learner>), ApiError> {
    let Json(payload) = payload?;
    let learner = state.store().register_learner(payload, state.now())?;
    Ok((StatusCode::CREATED, Json(learner)))
}

async fn get_learner(
    State(state): State<AppState>,
    path: Result<Path<LearnerId>, PathRejection>,
) -> Result<Json<Learner>, ApiError> {
    let Path(learner_id) = path?;
    Ok(Json(state.require_learner(learner_id)?))
}

async fn get_dashboard(
    State(state): State<AppState>,
    path: Result<Path<LearnerId>, PathRejection>,
) -> Result<Json<Dashboard>, ApiError> {
    let Path(learner_id) = path?;
    let dashboard = state.store().dashboard(learner_id, state.today())?;
    Ok(Json(dashboard))
}

async fn list_vocabulary(
    State(state): State<AppState>,
    path: Result<Path<LearnerId>, PathRejection>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let Path(learner_id) = path?;
    state.require_learner(learner_id)?;
    Ok(Json(state.store().cards(learner_id)?))
}

async fn add_vocabulary(
    State(state): State<AppState>,
    path: Result<Path<LearnerId>, PathRejection>,
    payload: Result<Json<NewVocabulary>, JsonRejection>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    let Path(learner_id) = path?;
    let Json(payload) = payload?;
    let card = state
        .store()
        .add_card(learner_id, payload, state.now())?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn get_vocabulary(
    State(state): State<AppState>,
    path: Result<Path<(LearnerId, CardId)>, PathRejection>,
) -> Result<Json<Card>, ApiError> {
    let Path((learner_id, card_id)) = path?;
    match state.store().card(learner_id, card_id)? {
        Some(card) => Ok(Json(card)),
        None => Err(ApiError::not_found(format!("card {card_id} not found"))),
    }
}

async fn edit_vocabulary(
    State(state): State<AppState>,
    path: Result<Path<(LearnerId, CardId)>, PathRejection>,
    payload: Result<Json<VocabularyEdit>, JsonRejection>,
) -> Result<Json<Card>, ApiError> {
    let Path((learner_id, card_id)) = path?;
    let Json(payload) = payload?;
    let card = state.store().edit_card(learner_id, card_id, payload)?;
    Ok(Json(card))
}

async fn delete_vocabulary(
    State(state): State<AppState>,
    path: Result<Path<(LearnerId, CardId)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((learner_id, card_id)) = path?;
    if !state.store().delete_card(learner_id, card_id)? {
        return Err(ApiError::not_found(format!("card {card_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn next_review(
    State(state): State<AppState>,
    path: Result<Path<LearnerId>, PathRejection>,
) -> Result<Json<ReviewQueue>, ApiError> {
    let Path(learner_id) = path?;
    state.require_learner(learner_id)?;
    let queue = state.store().review_queue(learner_id, state.today())?;
    Ok(Json(queue))
}

async fn check_word(
    State(state): State<AppState>,
    path: Result<Path<LearnerId>, PathRejection>,
    payload: Result<Json<ReviewPayload>, JsonRejection>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let Path(learner_id) = path?;
    let Json(payload) = payload?;
    let (Some(word_id), Some(result)) = (payload.word_id, payload.result) else {
        return Err(ApiError::invalid("word_id and result are required"));
    };
    let outcome: ReviewOutcome = result
        .parse()
        .map_err(|err: crate::ParseOutcomeError| ApiError::invalid(err.to_string()))?;

    let card = state
        .store()
        .review_card(learner_id, word_id, outcome, state.now())
        .map_err(|err| match err {
            StoreError::NotFound(_) => ApiError::not_found(format!(
                "card {word_id} not found for learner {learner_id}"
            )),
            other => ApiError::from(other),
        })?;

    let summary = ReviewSummary::from(&card);
    Ok(Json(ReviewResponse {
        success: true,
        new_level: summary.new_level,
        next_review_date: summary.next_review_date,
        message: summary.message(),
    }))
}
