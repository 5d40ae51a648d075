//! Projects: multi-step outcomes the user has committed to.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ParseError;

/// Review interval for new projects, in days.
pub const DEFAULT_REVIEW_INTERVAL: u32 = 7;

/// An outcome requiring more than one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    /// One sentence: "The project is done when...".
    pub outcome_statement: String,
    pub status: ProjectStatus,
    /// How often the project should be reviewed, in days.
    pub review_interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<Timestamp>,
}

/// Stored project status. Unlike the other records, this one is chosen
/// by the user rather than derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Stalled,
    Someday,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Stalled => "stalled",
            Self::Someday => "someday",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "stalled" => Ok(Self::Stalled),
            "someday" => Ok(Self::Someday),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseError::new(
                "project status",
                s,
                &["active", "stalled", "someday", "completed"],
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub outcome_statement: String,
    /// Falls back to [`DEFAULT_REVIEW_INTERVAL`].
    pub review_interval: Option<u32>,
    pub notes: Option<String>,
}

impl Project {
    /// Create an active project.
    pub fn new(input: NewProject, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            outcome_statement: input.outcome_statement,
            status: ProjectStatus::Active,
            review_interval: input
                .review_interval
                .filter(|&days| days > 0)
                .unwrap_or(DEFAULT_REVIEW_INTERVAL),
            notes: input.notes,
            created_at: now,
            completed_at: None,
            last_reviewed_at: None,
        }
    }

    /// Move to a new status.
    ///
    /// `completed_at` is present exactly when the status is `Completed`.
    /// Re-completing a completed project keeps the first completion time.
    #[must_use]
    pub fn with_status(&self, status: ProjectStatus, now: Timestamp) -> Self {
        let completed_at = match status {
            ProjectStatus::Completed => Some(self.completed_at.unwrap_or(now)),
            _ => None,
        };
        Self {
            status,
            completed_at,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn mark_reviewed(&self, now: Timestamp) -> Self {
        Self {
            last_reviewed_at: Some(now),
            ..self.clone()
        }
    }
}
