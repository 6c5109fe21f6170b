use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use vocab_srs::{Card, IntervalPolicy, ReviewOutcome, record_review};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 14, 18, 45, 0).unwrap()
}

fn today() -> NaiveDate {
    now().date_naive()
}

fn card_at_level(level: u8, streak: u32) -> Card {
    let mut card = Card::new(1, 1, "바다", "biển", Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    card.level = level;
    card.consecutive_correct_count = streak;
    card.current_interval_days = IntervalPolicy::standard().interval_for(level);
    card
}

#[test]
fn correct_answer_moves_up_one_level() {
    let policy = IntervalPolicy::standard();
    for level in 1..=3u8 {
        let reviewed = record_review(card_at_level(level, 0), ReviewOutcome::Correct, now());
        assert_eq!(reviewed.level, level + 1);
        assert_eq!(reviewed.current_interval_days, policy.interval_for(level + 1));
    }
}

#[test]
fn correct_answer_at_top_level_stays_capped() {
    let reviewed = record_review(card_at_level(4, 5), ReviewOutcome::Correct, now());
    assert_eq!(reviewed.level, 4);
    assert_eq!(reviewed.consecutive_correct_count, 6);
    assert_eq!(reviewed.current_interval_days, 14);
}

#[test]
fn incorrect_answer_always_resets() {
    for level in 1..=4u8 {
        for streak in [0, 1, 3, 40] {
            let reviewed = record_review(card_at_level(level, streak), ReviewOutcome::Incorrect, now());
            assert_eq!(reviewed.level, 1);
            assert_eq!(reviewed.consecutive_correct_count, 0);
            assert_eq!(reviewed.current_interval_days, 1);
        }
    }
}

#[test]
fn next_review_is_today_plus_interval_for_both_outcomes() {
    for level in 1..=4u8 {
        for outcome in [ReviewOutcome::Correct, ReviewOutcome::Incorrect] {
            let reviewed = record_review(card_at_level(level, 0), outcome, now());
            assert_eq!(
                reviewed.next_review_date,
                today() + Duration::days(i64::from(reviewed.current_interval_days))
            );
            assert_eq!(reviewed.last_reviewed_at, Some(now()));
        }
    }
}

#[test]
fn repeated_misses_converge_to_the_same_state() {
    let once = record_review(card_at_level(3, 2), ReviewOutcome::Incorrect, now());
    let twice = record_review(once.clone(), ReviewOutcome::Incorrect, now());
    assert_eq!(
        (once.level, once.consecutive_correct_count, once.current_interval_days),
        (1, 0, 1)
    );
    assert_eq!(
        (twice.level, twice.consecutive_correct_count, twice.current_interval_days),
        (1, 0, 1)
    );
}

#[test]
fn run_of_correct_answers_reaches_top_in_three_steps() {
    let mut card = card_at_level(1, 0);
    let mut levels = Vec::new();
    for _ in 0..6 {
        card = record_review(card, ReviewOutcome::Correct, now());
        levels.push(card.level);
    }
    assert_eq!(levels, vec![2, 3, 4, 4, 4, 4]);
}

#[test]
fn three_correct_then_one_miss() {
    let mut card = card_at_level(1, 0);
    for _ in 0..3 {
        card = record_review(card, ReviewOutcome::Correct, now());
    }
    assert_eq!(card.level, 4);
    assert_eq!(card.consecutive_correct_count, 3);
    assert_eq!(card.current_interval_days, 14);

    let card = record_review(card, ReviewOutcome::Incorrect, now());
    assert_eq!(card.level, 1);
    assert_eq!(card.consecutive_correct_count, 0);
    assert_eq!(card.current_interval_days, 1);
    assert_eq!(card.next_review_date, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
}

#[test]
fn malformed_level_resolves_through_fallback() {
    let mut card = card_at_level(1, 0);
    card.level = 9;
    let reviewed = record_review(card, ReviewOutcome::Correct, now());
    assert_eq!(reviewed.level, 9);
    assert_eq!(reviewed.current_interval_days, 14);

    let mut card = card_at_level(1, 0);
    card.level = 0;
    let reviewed = record_review(card, ReviewOutcome::Correct, now());
    assert_eq!(reviewed.level, 1);
    assert_eq!(reviewed.current_interval_days, 1);
}

#[test]
fn content_fields_are_untouched_by_review() {
    let mut card = card_at_level(2, 1);
    card.hanja = Some("海".into());
    card.notes = Some("sea".into());
    let reviewed = record_review(card.clone(), ReviewOutcome::Correct, now());
    assert_eq!(reviewed.id, card.id);
    assert_eq!(reviewed.owner, card.owner);
    assert_eq!(reviewed.word, card.word);
    assert_eq!(reviewed.hanja, card.hanja);
    assert_eq!(reviewed.notes, card.notes);
    assert_eq!(reviewed.added_at, card.added_at);
}
