pub mod card;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod learner;
pub mod outcome;
pub mod persistence;
pub mod review;
pub mod scheduler;
pub mod telemetry;
pub mod vocabulary;

pub use card::{Card, CardId};
pub use config::{AppConfig, ConfigError, DatabaseLocation};
pub use learner::{Learner, LearnerId, NewLearner};
pub use outcome::{ParseOutcomeError, ReviewOutcome};
pub use persistence::{
    DeckEntry, SqliteVocabularyStore, StoreError, StoreResult, VocabularyStore,
    load_deck_from_csv, load_deck_from_json, save_deck_to_csv, save_deck_to_json,
};
pub use review::{Dashboard, ReviewQueue, ReviewSummary};
pub use scheduler::{IntervalPolicy, record_review, record_review_now};
pub use vocabulary::{NewVocabulary, VocabularyEdit};
