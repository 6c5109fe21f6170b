use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Result of a single review attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown review result '{0}' (expected 'correct' or 'incorrect')")]
pub struct ParseOutcomeError(pub String);

impl ReviewOutcome {
    pub fn is_correct(self) -> bool {
        matches!(self, ReviewOutcome::Correct)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewOutcome::Correct => "correct",
            ReviewOutcome::Incorrect => "incorrect",
        }
    }
}

impl From<bool> for ReviewOutcome {
    fn from(is_correct: bool) -> Self {
        if is_correct {
            ReviewOutcome::Correct
        } else {
            ReviewOutcome::Incorrect
        }
    }
}

impl FromStr for ReviewOutcome {
    type Err = ParseOutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "correct" => Ok(ReviewOutcome::Correct),
            "incorrect" => Ok(ReviewOutcome::Incorrect),
            _ => Err(ParseOutcomeError(s.to_string())),
        }
    }
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
