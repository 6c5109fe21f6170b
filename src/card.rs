use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::LearnerId;
use crate::scheduler::IntervalPolicy;

pub type CardId = i64;

/// A vocabulary entry tracked under spaced repetition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Learner that owns the card. Never changes after creation.
    pub owner: LearnerId,
    pub word: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hanja: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
    pub level: u8,
    pub consecutive_correct_count: u32,
    pub current_interval_days: u32,
    pub next_review_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl Card {
    /// A fresh card at the lowest level, due on the day it was added.
    pub fn new(
        id: CardId,
        owner: LearnerId,
        word: impl Into<String>,
        meaning: impl Into<String>,
        added_at: DateTime<Utc>,
    ) -> Self {
        let policy = IntervalPolicy::standard();
        let level = policy.min_level();
        Self {
            id,
            owner,
            word: word.into(),
            meaning: meaning.into(),
            hanja: None,
            example_sentence: None,
            notes: None,
            added_at,
            level,
            consecutive_correct_count: 0,
            current_interval_days: policy.interval_for(level),
            next_review_date: added_at.date_naive(),
            last_reviewed_at: None,
        }
    }

    /// Due on `next_review_date` itself and every day after.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review_date <= today
    }
}
