//! Core data model for tend.
//!
//! Five record kinds make up a user's system: inbox items, next actions,
//! projects, waiting-for items, and weekly reviews. Records are plain data
//! with immutable identity. Every transition borrows a record and returns a
//! new version; nothing is edited in place.
//!
//! Lifecycle state is never stored. It is derived from timestamps and "now"
//! by [`crate::state`].

mod inbox;
mod next_action;
mod project;
mod waiting_for;
mod weekly_review;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use inbox::{Disposition, InboxItem};
pub use next_action::{NewNextAction, NextAction};
pub use project::{DEFAULT_REVIEW_INTERVAL, NewProject, Project, ProjectStatus};
pub use waiting_for::{DEFAULT_FOLLOWUP_INTERVAL, NewWaitingFor, WaitingFor};
pub use weekly_review::{ReviewStep, WeeklyReview};

/// Error returned when a user-supplied tag or label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseError {
    kind: &'static str,
    value: String,
    expected: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

/// Where or how a next action can be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Context {
    #[serde(rename = "@computer")]
    Computer,
    #[serde(rename = "@calls")]
    Calls,
    #[serde(rename = "@home")]
    Home,
    #[serde(rename = "@errands")]
    Errands,
    #[serde(rename = "@office")]
    Office,
    #[serde(rename = "@agenda")]
    Agenda,
    #[serde(rename = "@anywhere")]
    Anywhere,
}

impl Context {
    /// Every context tag, in display order.
    pub const ALL: [Context; 7] = [
        Context::Computer,
        Context::Calls,
        Context::Home,
        Context::Errands,
        Context::Office,
        Context::Agenda,
        Context::Anywhere,
    ];

    /// The tag as written by users, e.g. `@calls`.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Computer => "@computer",
            Self::Calls => "@calls",
            Self::Home => "@home",
            Self::Errands => "@errands",
            Self::Office => "@office",
            Self::Agenda => "@agenda",
            Self::Anywhere => "@anywhere",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

impl FromStr for Context {
    type Err = ParseError;

    /// Accepts the tag with or without the leading `@`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('@').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.tag()[1..] == wanted)
            .ok_or_else(|| {
                ParseError::new("context", s, &Self::ALL.map(Context::tag))
            })
    }
}

/// Mental effort a next action requires. Ordered: `Low < Medium < High`.
///
/// Persisted as the integers 1, 2, 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Energy {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Energy {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl From<Energy> for u8 {
    fn from(energy: Energy) -> Self {
        energy as u8
    }
}

impl TryFrom<u8> for Energy {
    type Error = ParseError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(ParseError::new(
                "energy level",
                &other.to_string(),
                &["1", "2", "3"],
            )),
        }
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Energy {
    type Err = ParseError;

    /// Accepts `1`-`3` or `low`/`medium`/`high`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "low" => Ok(Self::Low),
            "2" | "medium" | "med" => Ok(Self::Medium),
            "3" | "high" => Ok(Self::High),
            _ => Err(ParseError::new(
                "energy level",
                s,
                &["1", "2", "3", "low", "medium", "high"],
            )),
        }
    }
}

/// The application state: every collection the rule core reads.
///
/// Owned by a single coordinator (the CLI) and passed by reference into
/// the engine, the checker, and the parser. Collections keep the order
/// they were loaded in; that order is the tie-break everywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub inbox_items: Vec<InboxItem>,
    pub next_actions: Vec<NextAction>,
    pub projects: Vec<Project>,
    pub waiting_for: Vec<WaitingFor>,
    pub weekly_reviews: Vec<WeeklyReview>,
}

impl Snapshot {
    /// Look up a project by id. Dangling ids yield `None`.
    pub fn project(&self, id: uuid::Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_parses_with_or_without_at() {
        assert_eq!("@errands".parse::<Context>().unwrap(), Context::Errands);
        assert_eq!("Calls".parse::<Context>().unwrap(), Context::Calls);
    }

    #[test]
    fn context_rejects_unknown_tag() {
        let err = "@garage".parse::<Context>().unwrap_err();
        assert!(err.to_string().contains("@garage"));
    }

    #[test]
    fn context_serializes_as_tag() {
        let json = serde_json::to_string(&Context::Anywhere).unwrap();
        assert_eq!(json, "\"@anywhere\"");
    }

    #[test]
    fn energy_is_ordered() {
        assert!(Energy::Low < Energy::Medium);
        assert!(Energy::Medium < Energy::High);
    }

    #[test]
    fn energy_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Energy::High).unwrap(), "3");
        let parsed: Energy = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Energy::Low);
        assert!(serde_json::from_str::<Energy>("4").is_err());
    }

    #[test]
    fn energy_parses_names_and_numbers() {
        assert_eq!("high".parse::<Energy>().unwrap(), Energy::High);
        assert_eq!("2".parse::<Energy>().unwrap(), Energy::Medium);
        assert!("0".parse::<Energy>().is_err());
    }
}
