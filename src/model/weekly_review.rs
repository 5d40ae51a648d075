//! Weekly reviews: the six-step audit ritual.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ParseError;

/// One pass through the weekly review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReview {
    pub id: Uuid,
    pub started_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    /// Steps in the order they were logged. Each appears at most once.
    pub steps_completed: Vec<ReviewStep>,
}

/// The fixed steps of a weekly review, in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStep {
    EmptyInbox,
    ReviewProjects,
    CheckWaitingFor,
    ReviewCalendarPast,
    ReviewCalendarFuture,
    ReviewSomedayMaybe,
}

impl ReviewStep {
    pub const ALL: [ReviewStep; 6] = [
        ReviewStep::EmptyInbox,
        ReviewStep::ReviewProjects,
        ReviewStep::CheckWaitingFor,
        ReviewStep::ReviewCalendarPast,
        ReviewStep::ReviewCalendarFuture,
        ReviewStep::ReviewSomedayMaybe,
    ];

    /// Stable identifier, as persisted.
    pub fn id(self) -> &'static str {
        match self {
            Self::EmptyInbox => "empty_inbox",
            Self::ReviewProjects => "review_projects",
            Self::CheckWaitingFor => "check_waiting_for",
            Self::ReviewCalendarPast => "review_calendar_past",
            Self::ReviewCalendarFuture => "review_calendar_future",
            Self::ReviewSomedayMaybe => "review_someday_maybe",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::EmptyInbox => "Empty Inbox",
            Self::ReviewProjects => "Review Projects",
            Self::CheckWaitingFor => "Check Waiting For",
            Self::ReviewCalendarPast => "Review Past Calendar",
            Self::ReviewCalendarFuture => "Review Future Calendar",
            Self::ReviewSomedayMaybe => "Review Someday/Maybe",
        }
    }
}

impl fmt::Display for ReviewStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReviewStep {
    type Err = ParseError;

    /// Accepts the identifier with `_` or `-` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|step| step.id() == wanted)
            .ok_or_else(|| ParseError::new("review step", s, &Self::ALL.map(ReviewStep::id)))
    }
}

impl WeeklyReview {
    pub fn start(now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: now,
            completed_at: None,
            steps_completed: Vec::new(),
        }
    }

    /// Log a step. Steps accumulate; logging one twice changes nothing.
    #[must_use]
    pub fn complete_step(&self, step: ReviewStep) -> Self {
        if self.steps_completed.contains(&step) {
            return self.clone();
        }
        let mut steps_completed = self.steps_completed.clone();
        steps_completed.push(step);
        Self {
            steps_completed,
            ..self.clone()
        }
    }

    /// Whether every step has been logged.
    pub fn is_fully_logged(&self) -> bool {
        ReviewStep::ALL
            .iter()
            .all(|step| self.steps_completed.contains(step))
    }

    /// Steps not yet logged, in canonical order.
    pub fn remaining_steps(&self) -> Vec<ReviewStep> {
        ReviewStep::ALL
            .into_iter()
            .filter(|step| !self.steps_completed.contains(step))
            .collect()
    }

    /// Finish the review. The completion time is set once and never moves.
    ///
    /// Callers decide whether a partial review may be force-finished.
    #[must_use]
    pub fn finish(&self, now: Timestamp) -> Self {
        Self {
            completed_at: Some(self.completed_at.unwrap_or(now)),
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

    #[test]
    fn steps_accumulate_without_duplicates() {
        let review = WeeklyReview::start(at(0))
            .complete_step(ReviewStep::ReviewProjects)
            .complete_step(ReviewStep::EmptyInbox)
            .complete_step(ReviewStep::ReviewProjects);

        assert_eq!(
            review.steps_completed,
            vec![ReviewStep::ReviewProjects, ReviewStep::EmptyInbox]
        );
        assert!(!review.is_fully_logged());
        assert_eq!(review.remaining_steps().len(), 4);
    }

    #[test]
    fn all_steps_logged() {
        let review = ReviewStep::ALL
            .into_iter()
            .fold(WeeklyReview::start(at(0)), |r, step| r.complete_step(step));
        assert!(review.is_fully_logged());
        assert!(review.remaining_steps().is_empty());
    }

    #[test]
    fn finish_sets_completion_once() {
        let review = WeeklyReview::start(at(0)).finish(at(60));
        assert_eq!(review.finish(at(120)).completed_at, Some(at(60)));
    }

    #[test]
    fn step_parses_from_id() {
        assert_eq!(
            "check-waiting-for".parse::<ReviewStep>().unwrap(),
            ReviewStep::CheckWaitingFor
        );
        assert!("sweep".parse::<ReviewStep>().is_err());
    }
}
