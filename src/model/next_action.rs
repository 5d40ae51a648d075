//! Next actions: the concrete, physical steps that move work forward.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Context, Energy};

/// A single visible step that can be done in one sitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
    pub id: Uuid,
    pub title: String,
    pub context: Context,
    pub energy: Energy,
    /// Estimated duration in minutes.
    pub time_estimate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    /// Defer-until: the action is hidden before this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<Timestamp>,
}

/// Everything the clarification workflow decides about a new action.
#[derive(Debug, Clone)]
pub struct NewNextAction {
    pub title: String,
    pub context: Context,
    pub energy: Energy,
    pub time_estimate: u32,
    pub project_id: Option<Uuid>,
    pub due_date: Option<Timestamp>,
    pub start_date: Option<Timestamp>,
    pub notes: Option<String>,
}

impl NextAction {
    pub fn new(input: NewNextAction, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            context: input.context,
            energy: input.energy,
            time_estimate: input.time_estimate,
            project_id: input.project_id,
            due_date: input.due_date,
            start_date: input.start_date,
            notes: input.notes,
            created_at: now,
            completed_at: None,
            last_reviewed_at: None,
        }
    }

    /// Replace the clarified details. Identity, creation, completion and
    /// review times stay as they were.
    #[must_use]
    pub fn with_details(&self, input: NewNextAction) -> Self {
        Self {
            title: input.title,
            context: input.context,
            energy: input.energy,
            time_estimate: input.time_estimate,
            project_id: input.project_id,
            due_date: input.due_date,
            start_date: input.start_date,
            notes: input.notes,
            ..self.clone()
        }
    }

    /// Mark done. An action that is already done keeps its completion time.
    #[must_use]
    pub fn complete(&self, now: Timestamp) -> Self {
        Self {
            completed_at: Some(self.completed_at.unwrap_or(now)),
            ..self.clone()
        }
    }

    /// The explicit un-complete: the only way a completion time goes away.
    #[must_use]
    pub fn uncomplete(&self) -> Self {
        Self {
            completed_at: None,
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
