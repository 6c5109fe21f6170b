//! Input shapes for adding and editing vocabulary.
//!
//! Only the content fields are editable; the spaced-repetition fields of a
//! card are owned by the scheduler.

use serde::{Deserialize, Serialize};

use crate::persistence::{StoreError, StoreResult};

pub const MAX_WORD_CHARS: usize = 100;
pub const MAX_HANJA_CHARS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVocabulary {
    pub word: String,
    pub meaning: String,
    #[serde(default)]
    pub hanja: Option<String>,
    #[serde(default)]
    pub example_sentence: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Replacement content for an existing card.
pub type VocabularyEdit = NewVocabulary;

impl NewVocabulary {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            ..Self::default()
        }
    }

    pub fn with_hanja(mut self, hanja: impl Into<String>) -> Self {
        self.hanja = Some(hanja.into());
        self
    }

    pub fn with_example(mut self, sentence: impl Into<String>) -> Self {
        self.example_sentence = Some(sentence.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(self) -> StoreResult<Self> {
        let word = self.word.trim().to_string();
        let meaning = self.meaning.trim().to_string();
        if word.is_empty() {
            return Err(StoreError::InvalidData("word is required".into()));
        }
        if word.chars().count() > MAX_WORD_CHARS {
            return Err(StoreError::InvalidData(format!(
                "word must be at most {MAX_WORD_CHARS} characters"
            )));
        }
        if meaning.is_empty() {
            return Err(StoreError::InvalidData("meaning is required".into()));
        }

        let hanja = non_blank(self.hanja);
        if let Some(hanja) = &hanja {
            if hanja.chars().count() > MAX_HANJA_CHARS {
                return Err(StoreError::InvalidData(format!(
                    "hanja must be at most {MAX_HANJA_CHARS} characters"
                )));
            }
        }

        Ok(Self {
            word,
            meaning,
            hanja,
            example_sentence: non_blank(self.example_sentence),
            notes: non_blank(self.notes),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
