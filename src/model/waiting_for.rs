//! Waiting-for items: commitments delegated to someone else.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Follow-up interval for new waiting-for items, in days.
pub const DEFAULT_FOLLOWUP_INTERVAL: u32 = 7;

/// Something another person owes the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingFor {
    pub id: Uuid,
    pub title: String,
    /// Who is responsible for delivering.
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_by: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    /// Days between follow-up reminders.
    pub followup_interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_followup_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub struct NewWaitingFor {
    pub title: String,
    pub owner: String,
    pub expected_by: Option<Timestamp>,
    pub project_id: Option<Uuid>,
    /// Falls back to [`DEFAULT_FOLLOWUP_INTERVAL`].
    pub followup_interval: Option<u32>,
    pub notes: Option<String>,
}

impl WaitingFor {
    pub fn new(input: NewWaitingFor, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            owner: input.owner,
            expected_by: input.expected_by,
            project_id: input.project_id,
            followup_interval: input
                .followup_interval
                .filter(|&days| days > 0)
                .unwrap_or(DEFAULT_FOLLOWUP_INTERVAL),
            notes: input.notes,
            created_at: now,
            last_followup_at: None,
            resolved_at: None,
        }
    }

    #[must_use]
    pub fn mark_followed_up(&self, now: Timestamp) -> Self {
        Self {
            last_followup_at: Some(now),
            ..self.clone()
        }
    }

    /// Resolution is terminal: resolving again keeps the first time.
    #[must_use]
    pub fn resolve(&self, now: Timestamp) -> Self {
        Self {
            resolved_at: Some(self.resolved_at.unwrap_or(now)),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_second(secs).unwrap()
    }

    fn sample() -> WaitingFor {
        WaitingFor::new(
            NewWaitingFor {
                title: "Signed contract".into(),
                owner: "Legal".into(),
                expected_by: None,
                project_id: None,
                followup_interval: None,
                notes: None,
            },
            at(0),
        )
    }

    #[test]
    fn new_uses_default_followup_interval() {
        assert_eq!(sample().followup_interval, DEFAULT_FOLLOWUP_INTERVAL);
    }

    #[test]
    fn resolve_is_terminal() {
        let resolved = sample().resolve(at(10));
        assert_eq!(resolved.resolve(at(20)).resolved_at, Some(at(10)));
    }

    #[test]
    fn follow_up_moves_forward() {
        let item = sample().mark_followed_up(at(10)).mark_followed_up(at(20));
        assert_eq!(item.last_followup_at, Some(at(20)));
    }
}
