//! Spaced-repetition scheduling.
//!
//! Each card sits on a mastery level. A correct answer moves it one level up
//! (capped at the highest level in the policy table) and a miss drops it back
//! to the lowest level. The next review date is always `today + interval`,
//! where the interval is looked up from the policy table for the new level.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};

use crate::{Card, ReviewOutcome};

static STANDARD_POLICY: LazyLock<IntervalPolicy> = LazyLock::new(|| IntervalPolicy {
    intervals: BTreeMap::from([(1, 1), (2, 3), (3, 7), (4, 14)]),
});

/// Ordered mapping from mastery level to review interval in days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalPolicy {
    intervals: BTreeMap<u8, u32>,
}

impl IntervalPolicy {
    /// The fixed 1 / 3 / 7 / 14 day table used by every store and endpoint.
    pub fn standard() -> &'static IntervalPolicy {
        &STANDARD_POLICY
    }

    /// Builds a policy from `(level, days)` pairs. Returns `None` for an empty table.
    pub fn from_pairs<I>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (u8, u32)>,
    {
        let intervals: BTreeMap<u8, u32> = pairs.into_iter().collect();
        if intervals.is_empty() {
            return None;
        }
        Some(Self { intervals })
    }

    pub fn min_level(&self) -> u8 {
        self.intervals.keys().next().copied().unwrap_or(1)
    }

    pub fn max_level(&self) -> u8 {
        self.intervals.keys().next_back().copied().unwrap_or(1)
    }

    /// Interval in days for `level`.
    ///
    /// Never fails: a level past the table resolves to the highest defined
    /// level, a level below it to the lowest, and a gap to the closest
    /// defined level underneath.
    pub fn interval_for(&self, level: u8) -> u32 {
        self.intervals
            .range(..=level)
            .next_back()
            .or_else(|| self.intervals.iter().next())
            .map(|(_, days)| *days)
            .unwrap_or(1)
    }

    pub fn levels(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.intervals.iter().map(|(level, days)| (*level, *days))
    }

    /// Applies one review to `card` and returns the updated state.
    pub fn apply(&self, mut card: Card, outcome: ReviewOutcome, now: DateTime<Utc>) -> Card {
        match outcome {
            ReviewOutcome::Correct => {
                card.consecutive_correct_count = card.consecutive_correct_count.saturating_add(1);
                if card.level < self.max_level() {
                    card.level += 1;
                }
                card.current_interval_days = self.interval_for(card.level);
            }
            ReviewOutcome::Incorrect => {
                card.level = self.min_level();
                card.consecutive_correct_count = 0;
                card.current_interval_days = self.interval_for(card.level);
            }
        }

        card.next_review_date =
            now.date_naive() + Duration::days(i64::from(card.current_interval_days));
        card.last_reviewed_at = Some(now);
        card
    }
}

/// Records a review at `now` using the standard policy.
pub fn record_review(card: Card, outcome: ReviewOutcome, now: DateTime<Utc>) -> Card {
    IntervalPolicy::standard().apply(card, outcome, now)
}

pub fn record_review_now(card: Card, outcome: ReviewOutcome) -> Card {
    record_review(card, outcome, Utc::now())
}
