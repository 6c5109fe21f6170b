use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Card, CardId};

/// What a caller reports back after a review has been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub card_id: CardId,
    pub new_level: u8,
    pub consecutive_correct_count: u32,
    pub current_interval_days: u32,
    pub next_review_date: NaiveDate,
}

impl ReviewSummary {
    pub fn message(&self) -> String {
        format!(
            "New level: {}. Next review on: {}",
            self.new_level,
            self.next_review_date.format("%Y-%m-%d")
        )
    }
}

impl From<&Card> for ReviewSummary {
    fn from(card: &Card) -> Self {
        Self {
            card_id: card.id,
            new_level: card.level,
            consecutive_correct_count: card.consecutive_correct_count,
            current_interval_days: card.current_interval_days,
            next_review_date: card.next_review_date,
        }
    }
}

/// The card to show next plus how many more are waiting behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewQueue {
    pub card: Option<Card>,
    pub remaining_count: usize,
}

impl ReviewQueue {
    /// `due` must already be ordered by `next_review_date`.
    pub fn from_due(mut due: Vec<Card>) -> Self {
        if due.is_empty() {
            return Self {
                card: None,
                remaining_count: 0,
            };
        }
        let remaining_count = due.len() - 1;
        let card = due.swap_remove(0);
        Self {
            card: Some(card),
            remaining_count,
        }
    }

    pub fn is_done(&self) -> bool {
        self.card.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_words: usize,
    pub words_to_review_count: usize,
    pub learner_name: String,
}
