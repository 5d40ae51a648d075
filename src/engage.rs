//! Engagement: "what should I do right now?"
//!
//! Filters next actions down to those doable in the current situation,
//! scores each with four additive sub-scores, and orders them best-first.
//! Every sub-score is reported so the ranking can be explained.

use jiff::Timestamp;
use serde::Serialize;

use crate::model::{Context, Energy, NextAction, Snapshot};
use crate::state::{self, ActionState, WaitingState};

pub const URGENCY_MAX: f64 = 80.0;
pub const PROJECT_STALENESS_MAX: f64 = 30.0;
pub const WAITING_FOR_RISK_MAX: f64 = 30.0;
pub const AGE_MAX: f64 = 20.0;

/// Flat staleness score for a project that was never reviewed.
const NEVER_REVIEWED_STALENESS: f64 = 20.0;

/// Risk added per escalated waiting-for on the same project.
const RISK_PER_ESCALATION: f64 = 15.0;

/// Days of age at which the age score saturates.
const AGE_SATURATION_DAYS: f64 = 30.0;

/// The user's current situation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Situation {
    /// Acceptable contexts. Empty means nothing is eligible.
    pub contexts: Vec<Context>,
    /// The most effort the user can give right now.
    pub energy: Energy,
    pub available_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub urgency: f64,
    pub project_staleness: f64,
    pub waiting_for_risk: f64,
    pub age: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.urgency + self.project_staleness + self.waiting_for_risk + self.age
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAction {
    pub action: NextAction,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Whether an action can be done in the given situation.
pub fn is_eligible(action: &NextAction, situation: &Situation, now: Timestamp) -> bool {
    state::action_state(action, now) == ActionState::Available
        && situation.contexts.contains(&action.context)
        && action.energy <= situation.energy
        && action.time_estimate <= situation.available_minutes
}

/// Rank every eligible next action, highest score first.
///
/// The sort is stable, so equal scores keep collection order. Nothing is
/// truncated; callers take as many as they want to show.
pub fn rank(situation: &Situation, snapshot: &Snapshot, now: Timestamp) -> Vec<RankedAction> {
    let mut ranked: Vec<RankedAction> = snapshot
        .next_actions
        .iter()
        .filter(|action| is_eligible(action, situation, now))
        .map(|action| {
            let breakdown = score(action, snapshot, now);
            RankedAction {
                action: action.clone(),
                score: breakdown.total(),
                breakdown,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    tracing::debug!(
        candidates = snapshot.next_actions.len(),
        eligible = ranked.len(),
        "ranked next actions"
    );
    ranked
}

/// Compute all four sub-scores for one action.
pub fn score(action: &NextAction, snapshot: &Snapshot, now: Timestamp) -> ScoreBreakdown {
    ScoreBreakdown {
        urgency: urgency_score(action, now),
        project_staleness: project_staleness_score(action, snapshot, now),
        waiting_for_risk: waiting_for_risk_score(action, snapshot, now),
        age: age_score(action, now),
    }
}

/// Step function of days until due. No due date scores zero.
pub fn urgency_score(action: &NextAction, now: Timestamp) -> f64 {
    let Some(due) = action.due_date else {
        return 0.0;
    };
    let days_until_due = state::days_between(now, due);
    if days_until_due < 0.0 {
        URGENCY_MAX
    } else if days_until_due <= 1.0 {
        60.0
    } else if days_until_due <= 3.0 {
        40.0
    } else if days_until_due <= 7.0 {
        25.0
    } else {
        10.0
    }
}

/// How overdue the owning project is for review, relative to its interval.
pub fn project_staleness_score(action: &NextAction, snapshot: &Snapshot, now: Timestamp) -> f64 {
    let Some(project) = action.project_id.and_then(|id| snapshot.project(id)) else {
        return 0.0;
    };
    let Some(reviewed) = project.last_reviewed_at else {
        return NEVER_REVIEWED_STALENESS;
    };
    let interval = f64::from(project.review_interval.max(1));
    let days = state::days_between(reviewed, now).max(0.0);
    (PROJECT_STALENESS_MAX * days / interval).min(PROJECT_STALENESS_MAX)
}

/// Pressure from escalated waiting-fors that share the action's project.
pub fn waiting_for_risk_score(action: &NextAction, snapshot: &Snapshot, now: Timestamp) -> f64 {
    let Some(project_id) = action.project_id else {
        return 0.0;
    };
    let escalated = snapshot
        .waiting_for
        .iter()
        .filter(|w| w.project_id == Some(project_id))
        .filter(|w| state::waiting_state(w, now) == WaitingState::Escalated)
        .count();
    #[allow(clippy::cast_precision_loss)]
    let escalated = escalated as f64;
    (RISK_PER_ESCALATION * escalated).min(WAITING_FOR_RISK_MAX)
}

/// Older actions drift upward so nothing sits forever.
pub fn age_score(action: &NextAction, now: Timestamp) -> f64 {
    let days = state::days_between(action.created_at, now).max(0.0);
    (AGE_MAX * days / AGE_SATURATION_DAYS).min(AGE_MAX)
}
