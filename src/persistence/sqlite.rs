use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use tracing::{debug, info, warn};

use super::{DeckEntry, StoreError, StoreResult, VocabularyStore, validate_entries};
use crate::{
    Card, CardId, DatabaseLocation, Learner, LearnerId, NewLearner, NewVocabulary, ReviewOutcome,
    VocabularyEdit, learner::normalize_email, scheduler,
};

const CARD_COLUMNS: &str = "id, learner_id, word, meaning, hanja, example_sentence, notes, \
     added_at, level, consecutive_correct_count, current_interval_days, next_review_date, \
     last_reviewed_at";

const LEARNER_COLUMNS: &str = "id, email, full_name, created_at";

pub struct SqliteVocabularyStore {
    connection: Mutex<Connection>,
}

impl SqliteVocabularyStore {
    pub fn new<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn open(location: &DatabaseLocation) -> StoreResult<Self> {
        match location {
            DatabaseLocation::InMemory => Self::in_memory(),
            DatabaseLocation::File(path) => Self::new(path),
        }
    }

    fn from_connection(connection: Connection) -> StoreResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> StoreResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS learners (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS vocabularies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                learner_id INTEGER NOT NULL REFERENCES learners(id) ON DELETE CASCADE,
                word TEXT NOT NULL,
                meaning TEXT NOT NULL,
                hanja TEXT,
                example_sentence TEXT,
                notes TEXT,
                added_at TEXT NOT NULL,
                level INTEGER NOT NULL DEFAULT 1,
                consecutive_correct_count INTEGER NOT NULL DEFAULT 0,
                current_interval_days INTEGER NOT NULL DEFAULT 1,
                next_review_date TEXT NOT NULL,
                last_reviewed_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_vocabularies_learner
                ON vocabularies (learner_id);
            CREATE INDEX IF NOT EXISTS idx_vocabularies_next_review
                ON vocabularies (learner_id, next_review_date);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn learner_exists(conn: &Connection, id: LearnerId) -> StoreResult<bool> {
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM learners WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn select_card(conn: &Connection, owner: LearnerId, id: CardId) -> StoreResult<Option<Card>> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM vocabularies WHERE id = ?1 AND learner_id = ?2");
        Ok(conn
            .query_row(&sql, params![id, owner], card_from_row)
            .optional()?)
    }

    fn insert_card(conn: &Connection, card: &Card) -> StoreResult<CardId> {
        conn.execute(
            "INSERT INTO vocabularies (
                learner_id, word, meaning, hanja, example_sentence, notes, added_at,
                level, consecutive_correct_count, current_interval_days, next_review_date,
                last_reviewed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                card.owner,
                card.word,
                card.meaning,
                card.hanja,
                card.example_sentence,
                card.notes,
                card.added_at,
                card.level,
                card.consecutive_correct_count,
                card.current_interval_days,
                card.next_review_date,
                card.last_reviewed_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn write_schedule(conn: &Connection, card: &Card) -> StoreResult<()> {
        let updated = conn.execute(
            "UPDATE vocabularies
             SET level = ?1, consecutive_correct_count = ?2, current_interval_days = ?3,
                 next_review_date = ?4, last_reviewed_at = ?5
             WHERE id = ?6 AND learner_id = ?7",
            params![
                card.level,
                card.consecutive_correct_count,
                card.current_interval_days,
                card.next_review_date,
                card.last_reviewed_at,
                card.id,
                card.owner,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("card {} not found", card.id)));
        }
        Ok(())
    }
}

impl VocabularyStore for SqliteVocabularyStore {
    fn register_learner(&self, learner: NewLearner, now: DateTime<Utc>) -> StoreResult<Learner> {
        let learner = learner.validate()?;
        let mut conn = self.connection.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let taken: Option<i64> = tx
            .query_row(
                "SELECT id FROM learners WHERE email = ?1",
                params![learner.email],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(StoreError::Conflict(format!(
                "email {} is already registered",
                learner.email
            )));
        }

        tx.execute(
            "INSERT INTO learners (email, full_name, created_at) VALUES (?1, ?2, ?3)",
            params![learner.email, learner.full_name, now],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(learner_id = id, email = %learner.email, "registered learner");
        Ok(Learner {
            id,
            email: learner.email,
            full_name: learner.full_name,
            created_at: now,
        })
    }

    fn learner(&self, id: LearnerId) -> StoreResult<Option<Learner>> {
        let conn = self.connection.lock();
        let sql = format!("SELECT {LEARNER_COLUMNS} FROM learners WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], learner_from_row).optional()?)
    }

    fn learner_by_email(&self, email: &str) -> StoreResult<Option<Learner>> {
        let conn = self.connection.lock();
        let sql = format!("SELECT {LEARNER_COLUMNS} FROM learners WHERE email = ?1");
        Ok(conn
            .query_row(&sql, params![normalize_email(email)], learner_from_row)
            .optional()?)
    }

    fn learners(&self) -> StoreResult<Vec<Learner>> {
        let conn = self.connection.lock();
        let sql = format!("SELECT {LEARNER_COLUMNS} FROM learners ORDER BY id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let learners = stmt
            .query_map([], learner_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(learners)
    }

    fn add_card(
        &self,
        owner: LearnerId,
        vocabulary: NewVocabulary,
        now: DateTime<Utc>,
    ) -> StoreResult<Card> {
        let vocabulary = vocabulary.validate()?;
        let conn = self.connection.lock();
        if !Self::learner_exists(&conn, owner)? {
            return Err(StoreError::NotFound(format!("learner {owner} not found")));
        }

        let mut card = Card::new(0, owner, vocabulary.word, vocabulary.meaning, now);
        card.hanja = vocabulary.hanja;
        card.example_sentence = vocabulary.example_sentence;
        card.notes = vocabulary.notes;
        card.id = Self::insert_card(&conn, &card)?;

        info!(learner_id = owner, card_id = card.id, word = %card.word, "added card");
        Ok(card)
    }

    fn card(&self, owner: LearnerId, id: CardId) -> StoreResult<Option<Card>> {
        let conn = self.connection.lock();
        Self::select_card(&conn, owner, id)
    }

    fn cards(&self, owner: LearnerId) -> StoreResult<Vec<Card>> {
        let conn = self.connection.lock();
        let sql = format!(
            "SELECT {CARD_COLUMNS} FROM vocabularies WHERE learner_id = ?1
             ORDER BY added_at DESC, id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map(params![owner], card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    fn due_cards(&self, owner: LearnerId, today: NaiveDate) -> StoreResult<Vec<Card>> {
        let conn = self.connection.lock();
        let sql = format!(
            "SELECT {CARD_COLUMNS} FROM vocabularies
             WHERE learner_id = ?1 AND next_review_date <= ?2
             ORDER BY next_review_date ASC, id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map(params![owner, today], card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    fn edit_card(&self, owner: LearnerId, id: CardId, edit: VocabularyEdit) -> StoreResult<Card> {
        let edit = edit.validate()?;
        let mut conn = self.connection.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let updated = tx.execute(
            "UPDATE vocabularies
             SET word = ?1, meaning = ?2, hanja = ?3, example_sentence = ?4, notes = ?5
             WHERE id = ?6 AND learner_id = ?7",
            params![
                edit.word,
                edit.meaning,
                edit.hanja,
                edit.example_sentence,
                edit.notes,
                id,
                owner,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("card {id} not found")));
        }
        let card = Self::select_card(&tx, owner, id)?
            .ok_or_else(|| StoreError::NotFound(format!("card {id} not found")))?;
        tx.commit()?;
        Ok(card)
    }

    fn delete_card(&self, owner: LearnerId, id: CardId) -> StoreResult<bool> {
        let conn = self.connection.lock();
        let removed = conn.execute(
            "DELETE FROM vocabularies WHERE id = ?1 AND learner_id = ?2",
            params![id, owner],
        )?;
        if removed > 0 {
            info!(learner_id = owner, card_id = id, "deleted card");
        }
        Ok(removed > 0)
    }

    fn review_card(
        &self,
        owner: LearnerId,
        id: CardId,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> StoreResult<Card> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let card = Self::select_card(&tx, owner, id)?
            .ok_or_else(|| StoreError::NotFound(format!("card {id} not found")))?;

        let previous_level = card.level;
        let reviewed = scheduler::record_review(card, outcome, now);
        Self::write_schedule(&tx, &reviewed)?;
        tx.commit()?;

        debug!(
            learner_id = owner,
            card_id = id,
            %outcome,
            previous_level,
            level = reviewed.level,
            interval_days = reviewed.current_interval_days,
            next_review = %reviewed.next_review_date,
            "recorded review"
        );
        Ok(reviewed)
    }

    fn import_entries(&self, owner: LearnerId, entries: &[DeckEntry]) -> StoreResult<usize> {
        if let Err(err) = validate_entries(entries) {
            warn!(learner_id = owner, error = %err, "rejected deck import");
            return Err(err);
        }
        let mut conn = self.connection.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !Self::learner_exists(&tx, owner)? {
            return Err(StoreError::NotFound(format!("learner {owner} not found")));
        }
        for entry in entries {
            let card = entry.clone().into_card(0, owner);
            Self::insert_card(&tx, &card)?;
        }
        tx.commit()?;

        info!(learner_id = owner, count = entries.len(), "imported deck");
        Ok(entries.len())
    }
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        owner: row.get(1)?,
        word: row.get(2)?,
        meaning: row.get(3)?,
        hanja: row.get(4)?,
        example_sentence: row.get(5)?,
        notes: row.get(6)?,
        added_at: row.get(7)?,
        level: row.get(8)?,
        consecutive_correct_count: row.get(9)?,
        current_interval_days: row.get(10)?,
        next_review_date: row.get(11)?,
        last_reviewed_at: row.get(12)?,
    })
}

fn learner_from_row(row: &Row<'_>) -> rusqlite::Result<Learner> {
    Ok(Learner {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        created_at: row.get(3)?,
    })
}
