use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{StoreError, StoreResult, validate_entries};
use crate::{Card, CardId, LearnerId};

/// A card as it appears in an exported deck: content plus scheduling state,
/// without the store-assigned id or owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckEntry {
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

impl DeckEntry {
    pub fn into_card(self, id: CardId, owner: LearnerId) -> Card {
        Card {
            id,
            owner,
            word: self.word,
            meaning: self.meaning,
            hanja: self.hanja,
            example_sentence: self.example_sentence,
            notes: self.notes,
            added_at: self.added_at,
            level: self.level,
            consecutive_correct_count: self.consecutive_correct_count,
            current_interval_days: self.current_interval_days,
            next_review_date: self.next_review_date,
            last_reviewed_at: self.last_reviewed_at,
        }
    }
}

impl From<&Card> for DeckEntry {
    fn from(card: &Card) -> Self {
        Self {
            word: card.word.clone(),
            meaning: card.meaning.clone(),
            hanja: card.hanja.clone(),
            example_sentence: card.example_sentence.clone(),
            notes: card.notes.clone(),
            added_at: card.added_at,
            level: card.level,
            consecutive_correct_count: card.consecutive_correct_count,
            current_interval_days: card.current_interval_days,
            next_review_date: card.next_review_date,
            last_reviewed_at: card.last_reviewed_at,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct DeckSnapshot {
    exported_at: DateTime<Utc>,
    cards: Vec<DeckEntry>,
}

pub fn save_deck_to_json<P: AsRef<Path>>(cards: &[Card], path: P) -> StoreResult<()> {
    let snapshot = DeckSnapshot {
        exported_at: Utc::now(),
        cards: cards.iter().map(DeckEntry::from).collect(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_deck_from_json<P: AsRef<Path>>(path: P) -> StoreResult<Vec<DeckEntry>> {
    let file = File::open(path)?;
    let snapshot: DeckSnapshot = serde_json::from_reader(file)?;
    validate_entries(&snapshot.cards)?;
    Ok(snapshot.cards)
}

#[derive(Default, Serialize, Deserialize)]
struct DeckCsvRecord {
    word: String,
    meaning: String,
    hanja: String,
    example_sentence: String,
    notes: String,
    added_at: String,
    level: u8,
    consecutive_correct_count: u32,
    current_interval_days: u32,
    next_review_date: String,
    last_reviewed_at: String,
}

impl From<&Card> for DeckCsvRecord {
    fn from(card: &Card) -> Self {
        Self {
            word: card.word.clone(),
            meaning: card.meaning.clone(),
            hanja: card.hanja.clone().unwrap_or_default(),
            example_sentence: card.example_sentence.clone().unwrap_or_default(),
            notes: card.notes.clone().unwrap_or_default(),
            added_at: card.added_at.to_rfc3339(),
            level: card.level,
            consecutive_correct_count: card.consecutive_correct_count,
            current_interval_days: card.current_interval_days,
            next_review_date: format_date(card.next_review_date),
            last_reviewed_at: card
                .last_reviewed_at
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}

impl DeckCsvRecord {
    fn into_entry(self, row: usize) -> StoreResult<DeckEntry> {
        let added_at = parse_timestamp(&self.added_at, row, "added_at")?.ok_or_else(|| {
            StoreError::InvalidData(format!("row {row}: added_at is required"))
        })?;
        let next_review_date = parse_date(&self.next_review_date, row)?;
        let last_reviewed_at = parse_timestamp(&self.last_reviewed_at, row, "last_reviewed_at")?;
        Ok(DeckEntry {
            word: self.word,
            meaning: self.meaning,
            hanja: optional_text(self.hanja),
            example_sentence: optional_text(self.example_sentence),
            notes: optional_text(self.notes),
            added_at,
            level: self.level,
            consecutive_correct_count: self.consecutive_correct_count,
            current_interval_days: self.current_interval_days,
            next_review_date,
            last_reviewed_at,
        })
    }
}

pub fn save_deck_to_csv<P: AsRef<Path>>(cards: &[Card], path: P) -> StoreResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for card in cards {
        writer.serialize(DeckCsvRecord::from(card))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_deck_from_csv<P: AsRef<Path>>(path: P) -> StoreResult<Vec<DeckEntry>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut entries = Vec::new();
    for (idx, record) in reader.deserialize::<DeckCsvRecord>().enumerate() {
        entries.push(record?.into_entry(idx + 1)?);
    }
    validate_entries(&entries)?;
    Ok(entries)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(value: &str, row: usize) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
        StoreError::InvalidData(format!(
            "row {row}: invalid next_review_date '{value}': {err}"
        ))
    })
}

fn parse_timestamp(value: &str, row: usize, column: &str) -> StoreResult<Option<DateTime<Utc>>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| Some(ts.with_timezone(&Utc)))
        .map_err(|err| StoreError::InvalidData(format!("row {row}: invalid {column} '{value}': {err}")))
}

fn optional_text(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
