use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::{
    Card, CardId, Dashboard, Learner, LearnerId, NewLearner, NewVocabulary, ReviewOutcome,
    ReviewQueue, VocabularyEdit, scheduler::IntervalPolicy,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage for learners and their cards.
///
/// Implementations must run `review_card` as a single read-modify-write
/// unit per card so that concurrent reviews of one card cannot interleave.
pub trait VocabularyStore {
    fn register_learner(&self, learner: NewLearner, now: DateTime<Utc>) -> StoreResult<Learner>;
    fn learner(&self, id: LearnerId) -> StoreResult<Option<Learner>>;
    fn learner_by_email(&self, email: &str) -> StoreResult<Option<Learner>>;
    fn learners(&self) -> StoreResult<Vec<Learner>>;

    fn add_card(
        &self,
        owner: LearnerId,
        vocabulary: NewVocabulary,
        now: DateTime<Utc>,
    ) -> StoreResult<Card>;
    fn card(&self, owner: LearnerId, id: CardId) -> StoreResult<Option<Card>>;
    /// All cards of `owner`, most recently added first.
    fn cards(&self, owner: LearnerId) -> StoreResult<Vec<Card>>;
    /// Cards of `owner` due on or before `today`, earliest review date first.
    fn due_cards(&self, owner: LearnerId, today: NaiveDate) -> StoreResult<Vec<Card>>;
    fn edit_card(&self, owner: LearnerId, id: CardId, edit: VocabularyEdit) -> StoreResult<Card>;
    fn delete_card(&self, owner: LearnerId, id: CardId) -> StoreResult<bool>;
    fn review_card(
        &self,
        owner: LearnerId,
        id: CardId,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> StoreResult<Card>;
    /// Inserts deck entries as new cards of `owner`. Returns how many were added.
    fn import_entries(&self, owner: LearnerId, entries: &[DeckEntry]) -> StoreResult<usize>;

    fn dashboard(&self, owner: LearnerId, today: NaiveDate) -> StoreResult<Dashboard> {
        let learner = self
            .learner(owner)?
            .ok_or_else(|| StoreError::NotFound(format!("learner {owner} not found")))?;
        let cards = self.cards(owner)?;
        let words_to_review_count = cards.iter().filter(|card| card.is_due(today)).count();
        Ok(Dashboard {
            total_words: cards.len(),
            words_to_review_count,
            learner_name: learner.display_name().to_string(),
        })
    }

    fn review_queue(&self, owner: LearnerId, today: NaiveDate) -> StoreResult<ReviewQueue> {
        Ok(ReviewQueue::from_due(self.due_cards(owner, today)?))
    }
}

/// Checks that imported scheduling state is something the scheduler could have produced.
pub fn validate_entries(entries: &[DeckEntry]) -> StoreResult<()> {
    let policy = IntervalPolicy::standard();
    for (idx, entry) in entries.iter().enumerate() {
        let row = idx + 1;
        if entry.word.trim().is_empty() || entry.meaning.trim().is_empty() {
            return Err(StoreError::InvalidData(format!(
                "entry {row} is missing its word or meaning"
            )));
        }
        if entry.level < policy.min_level() || entry.level > policy.max_level() {
            return Err(StoreError::InvalidData(format!(
                "entry {row} ('{}') has level {} outside {}..={}",
                entry.word,
                entry.level,
                policy.min_level(),
                policy.max_level()
            )));
        }
        let expected = policy.interval_for(entry.level);
        if entry.current_interval_days != expected {
            return Err(StoreError::InvalidData(format!(
                "entry {row} ('{}') has interval {} days but level {} uses {}",
                entry.word, entry.current_interval_days, entry.level, expected
            )));
        }
        if entry.consecutive_correct_count > 0 && entry.last_reviewed_at.is_none() {
            return Err(StoreError::InvalidData(format!(
                "entry {row} ('{}') has a correct streak but was never reviewed",
                entry.word
            )));
        }
        // each correct answer below the cap raises level and streak together
        let min_streak = u32::from(entry.level - policy.min_level());
        if entry.consecutive_correct_count < min_streak {
            return Err(StoreError::InvalidData(format!(
                "entry {row} ('{}') is at level {} with a streak of {} (needs at least {})",
                entry.word, entry.level, entry.consecutive_correct_count, min_streak
            )));
        }
        let expected_review = match entry.last_reviewed_at {
            Some(reviewed_at) => {
                reviewed_at.date_naive() + Duration::days(i64::from(entry.current_interval_days))
            }
            None => entry.added_at.date_naive(),
        };
        if entry.next_review_date != expected_review {
            return Err(StoreError::InvalidData(format!(
                "entry {row} ('{}') has next review {} but its schedule gives {}",
                entry.word, entry.next_review_date, expected_review
            )));
        }
    }
    Ok(())
}

pub mod file;
pub mod sqlite;

pub use file::{
    DeckEntry, load_deck_from_csv, load_deck_from_json, save_deck_to_csv, save_deck_to_json,
};
pub use sqlite::SqliteVocabularyStore;
