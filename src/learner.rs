use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{StoreError, StoreResult};

pub type LearnerId = i64;

const MAX_FULL_NAME_CHARS: usize = 100;

/// Owner of a set of vocabulary cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learner {
    pub id: LearnerId,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

impl Learner {
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLearner {
    pub email: String,
    pub full_name: String,
}

impl NewLearner {
    pub fn new(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            full_name: full_name.into(),
        }
    }

    /// Trims both fields and lower-cases the email.
    pub fn validate(self) -> StoreResult<Self> {
        let email = normalize_email(&self.email);
        let valid_email = match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
            None => false,
        };
        if !valid_email {
            return Err(StoreError::InvalidData(format!(
                "'{}' is not a valid email address",
                self.email.trim()
            )));
        }

        let full_name = self.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(StoreError::InvalidData("full name is required".into()));
        }
        if full_name.chars().count() > MAX_FULL_NAME_CHARS {
            return Err(StoreError::InvalidData(format!(
                "full name must be at most {MAX_FULL_NAME_CHARS} characters"
            )));
        }

        Ok(Self { email, full_name })
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
