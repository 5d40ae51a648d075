//! Inbox items: raw captured thoughts awaiting clarification.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ParseError;

/// An unprocessed thought, captured as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxItem {
    pub id: Uuid,
    pub content: String,
    pub captured_at: Timestamp,
    pub clarified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarified_at: Option<Timestamp>,
    /// Set when the item is resolved without producing any action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<Disposition>,
}

/// Terminal, non-actionable outcome of clarifying an inbox item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Trash,
    Someday,
    Reference,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trash => "trash",
            Self::Someday => "someday",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Disposition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trash" => Ok(Self::Trash),
            "someday" => Ok(Self::Someday),
            "reference" => Ok(Self::Reference),
            _ => Err(ParseError::new(
                "disposition",
                s,
                &["trash", "someday", "reference"],
            )),
        }
    }
}

impl InboxItem {
    /// Capture a new thought. Surrounding whitespace is dropped.
    pub fn capture(content: &str, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.trim().to_string(),
            captured_at: now,
            clarified: false,
            clarified_at: None,
            disposition: None,
        }
    }

    /// Mark the item clarified, optionally with a non-actionable disposition.
    ///
    /// Clarifying an already-clarified item keeps its original timestamp
    /// and disposition.
    #[must_use]
    pub fn clarify(&self, disposition: Option<Disposition>, now: Timestamp) -> Self {
        if self.clarified {
            return self.clone();
        }
        Self {
            clarified: true,
            clarified_at: Some(now),
            disposition,
            ..self.clone()
        }
    }

    /// Only unclarified items can enter the clarification workflow.
    pub fn can_clarify(&self) -> bool {
        !self.clarified
    }
}
