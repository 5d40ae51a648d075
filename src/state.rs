//! State derivation: every lifecycle state is a pure function of a record
//! and a reference instant.
//!
//! Nothing here is cached on the records. The engine, the integrity
//! checker, and the CLI all call these functions so they agree on what
//! "available" or "escalated" means at a given moment.

use jiff::Timestamp;
use serde::Serialize;

use crate::model::{InboxItem, NextAction, Project, ProjectStatus, Snapshot, WaitingFor, WeeklyReview};

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Days since the last completed review after which the system is overdue.
pub const REVIEW_OVERDUE_DAYS: i64 = 7;

/// Days since the last completed review after which it is critically overdue.
pub const REVIEW_CRITICAL_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InboxState {
    Captured,
    Clarified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    Available,
    Deferred,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitingState {
    Open,
    Escalated,
    Resolved,
}

impl WaitingState {
    /// `Open` and `Escalated` both still count as outstanding.
    pub fn is_unresolved(self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

/// Aggregate health of the weekly review habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewHealth {
    Healthy,
    Overdue,
}

pub fn inbox_state(item: &InboxItem) -> InboxState {
    if item.clarified {
        InboxState::Clarified
    } else {
        InboxState::Captured
    }
}

pub fn action_state(action: &NextAction, now: Timestamp) -> ActionState {
    if action.completed_at.is_some() {
        return ActionState::Completed;
    }
    match action.start_date {
        Some(start) if start > now => ActionState::Deferred,
        _ => ActionState::Available,
    }
}

/// Derive a waiting-for item's state.
///
/// Escalation is a plain disjunction: either the expected-by date has
/// passed, or the next follow-up date has. The next follow-up is counted
/// from the last follow-up, or from creation if there was none.
pub fn waiting_state(item: &WaitingFor, now: Timestamp) -> WaitingState {
    if item.resolved_at.is_some() {
        return WaitingState::Resolved;
    }

    if item.expected_by.is_some_and(|expected| expected < now) {
        return WaitingState::Escalated;
    }

    let since = item.last_followup_at.unwrap_or(item.created_at);
    let next_followup_ms = since
        .as_millisecond()
        .saturating_add(i64::from(item.followup_interval).saturating_mul(MS_PER_DAY));
    if next_followup_ms < now.as_millisecond() {
        return WaitingState::Escalated;
    }

    WaitingState::Open
}

/// The most recently completed review, if any review was ever completed.
pub fn last_completed_review(reviews: &[WeeklyReview]) -> Option<&WeeklyReview> {
    reviews
        .iter()
        .filter(|r| r.completed_at.is_some())
        .max_by_key(|r| r.completed_at)
}

pub fn review_health(reviews: &[WeeklyReview], now: Timestamp) -> ReviewHealth {
    match last_completed_review(reviews).and_then(|r| r.completed_at) {
        Some(at) if whole_days_between(at, now) <= REVIEW_OVERDUE_DAYS => ReviewHealth::Healthy,
        _ => ReviewHealth::Overdue,
    }
}

/// True when no review was ever completed, or the last one is more than
/// [`REVIEW_CRITICAL_DAYS`] old.
pub fn review_critically_overdue(reviews: &[WeeklyReview], now: Timestamp) -> bool {
    match last_completed_review(reviews).and_then(|r| r.completed_at) {
        Some(at) => whole_days_between(at, now) > REVIEW_CRITICAL_DAYS,
        None => true,
    }
}

// ── Project transitions ──

pub fn can_activate(project: &Project) -> bool {
    matches!(project.status, ProjectStatus::Stalled | ProjectStatus::Someday)
}

pub fn can_complete(project: &Project) -> bool {
    matches!(project.status, ProjectStatus::Active | ProjectStatus::Stalled)
}

pub fn can_defer(project: &Project) -> bool {
    project.status == ProjectStatus::Active
}

/// Whether an active project has lost all forward motion: no available
/// action and no unresolved waiting-for. Does not change the project.
pub fn should_stall(project: &Project, snapshot: &Snapshot, now: Timestamp) -> bool {
    project.status == ProjectStatus::Active && !has_forward_motion(project, snapshot, now)
}

/// An available next action or an unresolved waiting-for references the project.
pub(crate) fn has_forward_motion(project: &Project, snapshot: &Snapshot, now: Timestamp) -> bool {
    let has_action = snapshot
        .next_actions
        .iter()
        .filter(|a| a.project_id == Some(project.id))
        .any(|a| action_state(a, now) == ActionState::Available);
    let has_waiting = snapshot
        .waiting_for
        .iter()
        .filter(|w| w.project_id == Some(project.id))
        .any(|w| waiting_state(w, now).is_unresolved());
    has_action || has_waiting
}

// ── Time arithmetic ──

/// Fractional days from `from` to `to`. Negative when `to` is earlier.
pub(crate) fn days_between(from: Timestamp, to: Timestamp) -> f64 {
    let ms = to.as_millisecond() - from.as_millisecond();
    #[allow(clippy::cast_precision_loss)]
    let days = ms as f64 / MS_PER_DAY as f64;
    days
}

/// Whole days elapsed from `from` to `to`, truncated toward zero.
pub(crate) fn whole_days_between(from: Timestamp, to: Timestamp) -> i64 {
    (to.as_millisecond() - from.as_millisecond()) / MS_PER_DAY
}

/// Whole hours elapsed from `from` to `to`, truncated toward zero.
pub(crate) fn whole_hours_between(from: Timestamp, to: Timestamp) -> i64 {
    (to.as_millisecond() - from.as_millisecond()) / MS_PER_HOUR
}
