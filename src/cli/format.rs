//! Output formatting for CLI display.

use jiff::{Timestamp, tz::TimeZone};

use tend::engage::RankedAction;
use tend::integrity::{Severity, Violation};
use tend::model::{NextAction, Project, Snapshot, WaitingFor};
use tend::state::{self, ActionState, WaitingState};

use super::short_id;

/// A timestamp in the local time zone, to the minute.
pub(super) fn format_timestamp(ts: Timestamp) -> String {
    ts.to_zoned(TimeZone::system())
        .strftime("%Y-%m-%d %H:%M")
        .to_string()
}

/// Coarse elapsed time: `3d`, `5h`, `12m`.
pub(super) fn format_age(since: Timestamp, now: Timestamp) -> String {
    let secs = (now.as_second() - since.as_second()).max(0);
    match secs {
        s if s >= 86_400 => format!("{}d", s / 86_400),
        s if s >= 3_600 => format!("{}h", s / 3_600),
        s => format!("{}m", s / 60),
    }
}

/// Minutes as `45m`, `2h`, or `1h30m`.
pub(super) fn format_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h{m}m"),
    }
}

fn action_state_label(state: ActionState) -> &'static str {
    match state {
        ActionState::Available => "available",
        ActionState::Deferred => "deferred",
        ActionState::Completed => "done",
    }
}

pub(super) fn format_action(action: &NextAction, snapshot: &Snapshot, now: Timestamp) -> String {
    let mut line = format!(
        "{}  {:<9}  {:<6}  {:>5}  {:<9}  {}",
        short_id(action.id),
        action.context,
        action.energy.label(),
        format_minutes(action.time_estimate),
        action_state_label(state::action_state(action, now)),
        action.title,
    );
    if let Some(project) = action.project_id.and_then(|id| snapshot.project(id)) {
        line.push_str(&format!("  [{}]", project.title));
    }
    if let Some(due) = action.due_date {
        line.push_str(&format!("  due {}", format_timestamp(due)));
    }
    if let Some(start) = action.start_date.filter(|&s| s > now) {
        line.push_str(&format!("  starts {}", format_timestamp(start)));
    }
    line
}

pub(super) fn format_project(project: &Project, snapshot: &Snapshot, now: Timestamp) -> String {
    let open_actions = snapshot
        .next_actions
        .iter()
        .filter(|a| a.project_id == Some(project.id) && a.completed_at.is_none())
        .count();
    let reviewed = project
        .last_reviewed_at
        .map_or_else(|| "never".to_string(), |t| format!("{} ago", format_age(t, now)));
    format!(
        "{}  {:<9}  {}  ({} open, reviewed {reviewed})",
        short_id(project.id),
        project.status,
        project.title,
        open_actions,
    )
}

fn waiting_state_label(state: WaitingState) -> &'static str {
    match state {
        WaitingState::Open => "open",
        WaitingState::Escalated => "ESCALATED",
        WaitingState::Resolved => "resolved",
    }
}

pub(super) fn format_waiting(item: &WaitingFor, now: Timestamp) -> String {
    let mut line = format!(
        "{}  {:<9}  {} (from {})",
        short_id(item.id),
        waiting_state_label(state::waiting_state(item, now)),
        item.title,
        item.owner,
    );
    if let Some(expected) = item.expected_by {
        line.push_str(&format!("  expected {}", format_timestamp(expected)));
    }
    line
}

pub(super) fn format_ranked(position: usize, ranked: &RankedAction, snapshot: &Snapshot) -> String {
    let action = &ranked.action;
    let b = &ranked.breakdown;
    let mut out = format!(
        "{position}. {}  {}  ({}, {}, {})\n   score {:.1} = urgency {:.1} + staleness {:.1} + risk {:.1} + age {:.1}",
        short_id(action.id),
        action.title,
        action.context,
        action.energy.label(),
        format_minutes(action.time_estimate),
        ranked.score,
        b.urgency,
        b.project_staleness,
        b.waiting_for_risk,
        b.age,
    );
    if let Some(project) = action.project_id.and_then(|id| snapshot.project(id)) {
        out.push_str(&format!("\n   project: {}", project.title));
    }
    out
}

pub(super) fn format_violation(violation: &Violation) -> String {
    let severity = match violation.severity {
        Severity::Hard => "HARD",
        Severity::Soft => "soft",
    };
    let entity = violation
        .entity_id
        .map_or_else(|| "system".to_string(), short_id);
    format!(
        "[{severity}] {entity}  {}  ({})",
        violation.message,
        violation.rule.id()
    )
}
