//! System integrity: audit the whole entity graph for methodology violations.
//!
//! Hard violations mean the system's guarantees are broken (a project with
//! no way forward, a weekly review abandoned for weeks). Soft violations
//! are hygiene warnings. Rules are evaluated independently, so one record
//! can trip several of them.

use jiff::Timestamp;
use serde::Serialize;
use uuid::Uuid;

use crate::model::{ProjectStatus, Snapshot};
use crate::state::{self, ActionState, WaitingState};

/// Hours an inbox item may sit unclarified.
pub const INBOX_MAX_AGE_HOURS: i64 = 48;

/// Days an available action may go without review.
pub const ACTION_REVIEW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Hard,
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    NextAction,
    WaitingFor,
    InboxItem,
    WeeklyReview,
}

/// Machine-stable rule identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    ActiveProjectMustHaveNextActionOrWaitingFor,
    ActionMustBelongToActiveProject,
    WeeklyReviewNotCriticallyOverdue,
    #[serde(rename = "inbox_item_clarified_within_48h")]
    InboxItemClarifiedWithin48h,
    WaitingForFollowedUpWithinInterval,
    ProjectReviewedWithinInterval,
    #[serde(rename = "action_reviewed_within_30_days")]
    ActionReviewedWithin30Days,
}

impl Rule {
    pub fn id(self) -> &'static str {
        match self {
            Self::ActiveProjectMustHaveNextActionOrWaitingFor => {
                "active_project_must_have_next_action_or_waiting_for"
            }
            Self::ActionMustBelongToActiveProject => "action_must_belong_to_active_project",
            Self::WeeklyReviewNotCriticallyOverdue => "weekly_review_not_critically_overdue",
            Self::InboxItemClarifiedWithin48h => "inbox_item_clarified_within_48h",
            Self::WaitingForFollowedUpWithinInterval => "waiting_for_followed_up_within_interval",
            Self::ProjectReviewedWithinInterval => "project_reviewed_within_interval",
            Self::ActionReviewedWithin30Days => "action_reviewed_within_30_days",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::ActiveProjectMustHaveNextActionOrWaitingFor
            | Self::ActionMustBelongToActiveProject
            | Self::WeeklyReviewNotCriticallyOverdue => Severity::Hard,
            Self::InboxItemClarifiedWithin48h
            | Self::WaitingForFollowedUpWithinInterval
            | Self::ProjectReviewedWithinInterval
            | Self::ActionReviewedWithin30Days => Severity::Soft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub severity: Severity,
    pub entity_type: EntityKind,
    /// `None` for system-level violations not tied to one record.
    pub entity_id: Option<Uuid>,
    pub rule: Rule,
    pub message: String,
}

impl Violation {
    fn new(rule: Rule, entity_type: EntityKind, entity_id: Option<Uuid>, message: String) -> Self {
        Self {
            severity: rule.severity(),
            entity_type,
            entity_id,
            rule,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Every violation, in rule order then collection order.
    pub violations: Vec<Violation>,
    pub hard: Vec<Violation>,
    pub soft: Vec<Violation>,
    pub clean: bool,
}

impl IntegrityReport {
    fn from_violations(violations: Vec<Violation>) -> Self {
        let (hard, soft): (Vec<_>, Vec<_>) = violations
            .iter()
            .cloned()
            .partition(|v| v.severity == Severity::Hard);
        let clean = violations.is_empty();
        Self {
            violations,
            hard,
            soft,
            clean,
        }
    }
}

/// Run every rule against the snapshot.
///
/// Holds no state between calls: the same snapshot and `now` always give
/// the same report.
pub fn check(snapshot: &Snapshot, now: Timestamp) -> IntegrityReport {
    let mut violations = Vec::new();

    active_projects_have_motion(snapshot, now, &mut violations);
    actions_belong_to_active_projects(snapshot, now, &mut violations);
    weekly_review_not_critical(snapshot, now, &mut violations);
    inbox_clarified_promptly(snapshot, now, &mut violations);
    waiting_for_followed_up(snapshot, now, &mut violations);
    projects_reviewed(snapshot, now, &mut violations);
    actions_reviewed(snapshot, now, &mut violations);

    let report = IntegrityReport::from_violations(violations);
    tracing::debug!(
        hard = report.hard.len(),
        soft = report.soft.len(),
        "integrity check complete"
    );
    report
}

// ── Hard rules ──

fn active_projects_have_motion(snapshot: &Snapshot, now: Timestamp, out: &mut Vec<Violation>) {
    for project in snapshot
        .projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Active)
    {
        if !state::has_forward_motion(project, snapshot, now) {
            out.push(Violation::new(
                Rule::ActiveProjectMustHaveNextActionOrWaitingFor,
                EntityKind::Project,
                Some(project.id),
                format!(
                    "Project \"{}\" is active but has no available next action or open waiting-for.",
                    project.title
                ),
            ));
        }
    }
}

fn actions_belong_to_active_projects(
    snapshot: &Snapshot,
    now: Timestamp,
    out: &mut Vec<Violation>,
) {
    for action in snapshot
        .next_actions
        .iter()
        .filter(|a| state::action_state(a, now) == ActionState::Available)
    {
        // Dangling references are treated as "no project".
        let Some(project) = action.project_id.and_then(|id| snapshot.project(id)) else {
            continue;
        };
        if project.status != ProjectStatus::Active {
            out.push(Violation::new(
                Rule::ActionMustBelongToActiveProject,
                EntityKind::NextAction,
                Some(action.id),
                format!(
                    "Action \"{}\" is linked to project \"{}\" which is not active ({}).",
                    action.title, project.title, project.status
                ),
            ));
        }
    }
}

fn weekly_review_not_critical(snapshot: &Snapshot, now: Timestamp, out: &mut Vec<Violation>) {
    if state::review_critically_overdue(&snapshot.weekly_reviews, now) {
        out.push(Violation::new(
            Rule::WeeklyReviewNotCriticallyOverdue,
            EntityKind::WeeklyReview,
            None,
            format!(
                "Weekly review is more than {} days overdue.",
                state::REVIEW_CRITICAL_DAYS
            ),
        ));
    }
}

// ── Soft rules ──

fn inbox_clarified_promptly(snapshot: &Snapshot, now: Timestamp, out: &mut Vec<Violation>) {
    for item in snapshot.inbox_items.iter().filter(|i| !i.clarified) {
        if state::whole_hours_between(item.captured_at, now) > INBOX_MAX_AGE_HOURS {
            let preview: String = item.content.chars().take(40).collect();
            out.push(Violation::new(
                Rule::InboxItemClarifiedWithin48h,
                EntityKind::InboxItem,
                Some(item.id),
                format!(
                    "Inbox item \"{preview}\" is unclarified for more than {INBOX_MAX_AGE_HOURS} hours."
                ),
            ));
        }
    }
}

fn waiting_for_followed_up(snapshot: &Snapshot, now: Timestamp, out: &mut Vec<Violation>) {
    for item in snapshot
        .waiting_for
        .iter()
        .filter(|w| state::waiting_state(w, now) == WaitingState::Escalated)
    {
        out.push(Violation::new(
            Rule::WaitingForFollowedUpWithinInterval,
            EntityKind::WaitingFor,
            Some(item.id),
            format!(
                "Waiting on \"{}\" for \"{}\" needs follow-up.",
                item.owner, item.title
            ),
        ));
    }
}

fn projects_reviewed(snapshot: &Snapshot, now: Timestamp, out: &mut Vec<Violation>) {
    for project in snapshot
        .projects
        .iter()
        .filter(|p| matches!(p.status, ProjectStatus::Active | ProjectStatus::Stalled))
    {
        let last_review = project.last_reviewed_at.unwrap_or(project.created_at);
        if state::whole_days_between(last_review, now) > i64::from(project.review_interval) {
            out.push(Violation::new(
                Rule::ProjectReviewedWithinInterval,
                EntityKind::Project,
                Some(project.id),
                format!(
                    "Project \"{}\" has not been reviewed in {}+ days.",
                    project.title, project.review_interval
                ),
            ));
        }
    }
}

fn actions_reviewed(snapshot: &Snapshot, now: Timestamp, out: &mut Vec<Violation>) {
    for action in snapshot
        .next_actions
        .iter()
        .filter(|a| state::action_state(a, now) == ActionState::Available)
    {
        let last_review = action.last_reviewed_at.unwrap_or(action.created_at);
        if state::whole_days_between(last_review, now) > ACTION_REVIEW_DAYS {
            out.push(Violation::new(
                Rule::ActionReviewedWithin30Days,
                EntityKind::NextAction,
                Some(action.id),
                format!(
                    "Action \"{}\" has not been reviewed in {ACTION_REVIEW_DAYS}+ days.",
                    action.title
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{
        Context, Energy, InboxItem, NewNextAction, NewProject, NewWaitingFor, NextAction, Project,
        ReviewStep, WaitingFor, WeeklyReview,
    };

    const DAY: i64 = 86_400;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_second(secs).unwrap()
    }

    fn now() -> Timestamp {
        at(1_000 * DAY)
    }

    fn days_ago(days: i64) -> Timestamp {
        at(1_000 * DAY - days * DAY)
    }

    fn project(title: &str) -> Project {
        Project::new(
            NewProject {
                title: title.into(),
                outcome_statement: "Done.".into(),
                review_interval: None,
                notes: None,
            },
            days_ago(1),
        )
    }

    fn action(project_id: Option<Uuid>) -> NextAction {
        NextAction::new(
            NewNextAction {
                title: "Do the thing".into(),
                context: Context::Anywhere,
                energy: Energy::Low,
                time_estimate: 5,
                project_id,
                due_date: None,
                start_date: None,
                notes: None,
            },
            days_ago(1),
        )
    }

    fn waiting(project_id: Option<Uuid>, created: Timestamp) -> WaitingFor {
        WaitingFor::new(
            NewWaitingFor {
                title: "Invoice".into(),
                owner: "Acme".into(),
                expected_by: None,
                project_id,
                followup_interval: None,
                notes: None,
            },
            created,
        )
    }

    fn healthy_reviews() -> Vec<WeeklyReview> {
        vec![
            WeeklyReview::start(days_ago(2))
                .complete_step(ReviewStep::EmptyInbox)
                .finish(days_ago(2)),
        ]
    }

    fn rules(report: &IntegrityReport) -> Vec<Rule> {
        report.violations.iter().map(|v| v.rule).collect()
    }

    #[test]
    fn empty_system_only_flags_missing_review() {
        let report = check(&Snapshot::default(), now());
        assert_eq!(rules(&report), vec![Rule::WeeklyReviewNotCriticallyOverdue]);
        assert_eq!(report.hard.len(), 1);
        assert!(report.hard[0].entity_id.is_none());
        assert!(!report.clean);
    }

    #[test]
    fn clean_system() {
        let p = project("Kitchen");
        let snapshot = Snapshot {
            next_actions: vec![action(Some(p.id))],
            projects: vec![p],
            weekly_reviews: healthy_reviews(),
            ..Snapshot::default()
        };
        let report = check(&snapshot, now());
        assert!(report.clean, "{:?}", report.violations);
        assert!(report.hard.is_empty() && report.soft.is_empty());
    }

    #[test]
    fn active_project_without_motion_is_hard() {
        let p = project("Garden");
        let snapshot = Snapshot {
            projects: vec![p.clone()],
            weekly_reviews: healthy_reviews(),
            ..Snapshot::default()
        };
        let report = check(&snapshot, now());
        assert_eq!(report.hard.len(), 1);
        assert_eq!(
            report.hard[0].rule.id(),
            "active_project_must_have_next_action_or_waiting_for"
        );
        assert_eq!(report.hard[0].entity_id, Some(p.id));
        assert_eq!(report.hard[0].entity_type, EntityKind::Project);
    }

    #[test]
    fn escalated_waiting_for_still_counts_as_motion() {
        let p = project("Visa");
        let w = waiting(Some(p.id), days_ago(20));
        let snapshot = Snapshot {
            projects: vec![p],
            waiting_for: vec![w],
            weekly_reviews: healthy_reviews(),
            ..Snapshot::default()
        };
        let report = check(&snapshot, now());
        assert_eq!(rules(&report), vec![Rule::WaitingForFollowedUpWithinInterval]);
    }

    #[test]
    fn deferred_or_completed_actions_do_not_count_as_motion() {
        let p = project("Move");
        let mut deferred = action(Some(p.id));
        deferred.start_date = Some(at(1_001 * DAY));
        let done = action(Some(p.id)).complete(now());
        let resolved = waiting(Some(p.id), days_ago(1)).resolve(now());
        let snapshot = Snapshot {
            next_actions: vec![deferred, done],
            waiting_for: vec![resolved],
            projects: vec![p],
            weekly_reviews: healthy_reviews(),
            ..Snapshot::default()
        };
        let report = check(&snapshot, now());
        assert_eq!(
            rules(&report),
            vec![Rule::ActiveProjectMustHaveNextActionOrWaitingFor]
        );
    }

    #[test]
    fn action_on_inactive_project_is_hard() {
        let p = project("Blog").with_status(ProjectStatus::Someday, now());
        let a = action(Some(p.id));
        let dangling = action(Some(Uuid::new_v4()));
        let snapshot = Snapshot {
            next_actions: vec![a.clone(), dangling],
            projects: vec![p],
            weekly_reviews: healthy_reviews(),
            ..Snapshot::default()
        };
        let report = check(&snapshot, now());
        assert_eq!(rules(&report), vec![Rule::ActionMustBelongToActiveProject]);
        assert_eq!(report.hard[0].entity_id, Some(a.id));
        assert!(report.hard[0].message.contains("(someday)"));
    }

    #[test]
    fn stale_inbox_item_is_soft() {
        let old = InboxItem::capture("renew passport", at(1_000 * DAY - 49 * 3_600));
        let fresh = InboxItem::capture("new idea", at(1_000 * DAY - 47 * 3_600));
        let old_but_clarified =
            InboxItem::capture("done", days_ago(10)).clarify(None, days_ago(9));
        let snapshot = Snapshot {
            inbox_items: vec![old.clone(), fresh, old_but_clarified],
            weekly_reviews: healthy_reviews(),
            ..Snapshot::default()
        };
        let report = check(&snapshot, now());
        assert_eq!(rules(&report), vec![Rule::InboxItemClarifiedWithin48h]);
        assert_eq!(report.soft[0].entity_id, Some(old.id));
        assert_eq!(report.soft[0].severity, Severity::Soft);
    }

    #[test]
    fn inbox_preview_is_truncated() {
        let long = "x".repeat(100);
        let snapshot = Snapshot {
            inbox_items: vec![InboxItem::capture(&long, days_ago(5))],
            weekly_reviews: healthy_reviews(),
            ..Snapshot::default()
        };
        let report = check(&snapshot, now());
        assert!(report.soft[0].message.contains(&"x".repeat(40)));
        assert!(!report.soft[0].message.contains(&"x".repeat(41)));
    }

    #[test]
    fn unreviewed_project_and_action_are_soft() {
        let mut p = project("Taxes");
        p.created_at = days_ago(40);
        let mut a = action(Some(p.id));
        a.created_at = days_ago(31);
        let snapshot = Snapshot {
            next_actions: vec![a],
            projects: vec![p],
            weekly_reviews: healthy_reviews(),
            ..Snapshot::default()
        };
        let report = check(&snapshot, now());
        assert_eq!(
            rules(&report),
            vec![
                Rule::ProjectReviewedWithinInterval,
                Rule::ActionReviewedWithin30Days
            ]
        );
    }

    #[test]
    fn recent_review_clears_staleness() {
        let mut p = project("Taxes");
        p.created_at = days_ago(40);
        let p = p.mark_reviewed(days_ago(3));
        let mut a = action(Some(p.id));
        a.created_at = days_ago(60);
        let a = a.mark_reviewed(days_ago(30));
        let snapshot = Snapshot {
            next_actions: vec![a],
            projects: vec![p],
            weekly_reviews: healthy_reviews(),
            ..Snapshot::default()
        };
        assert!(check(&snapshot, now()).clean);
    }

    #[test]
    fn stalled_project_checked_for_review_only() {
        let mut p = project("Piano").with_status(ProjectStatus::Stalled, now());
        p.created_at = days_ago(9);
        let snapshot = Snapshot {
            projects: vec![p],
            weekly_reviews: healthy_reviews(),
            ..Snapshot::default()
        };
        let report = check(&snapshot, now());
        assert_eq!(rules(&report), vec![Rule::ProjectReviewedWithinInterval]);
    }

    #[test]
    fn partitions_match_flat_list() {
        let p = project("Orphaned");
        let snapshot = Snapshot {
            inbox_items: vec![InboxItem::capture("stale", days_ago(3))],
            projects: vec![p],
            ..Snapshot::default()
        };
        let report = check(&snapshot, now());
        assert_eq!(report.hard.len() + report.soft.len(), report.violations.len());
        assert!(report.hard.iter().all(|v| v.severity == Severity::Hard));
        assert!(report.soft.iter().all(|v| v.severity == Severity::Soft));
    }

    #[test]
    fn check_is_repeatable() {
        let p = project("Same");
        let snapshot = Snapshot {
            inbox_items: vec![InboxItem::capture("stale", days_ago(3))],
            waiting_for: vec![waiting(None, days_ago(9))],
            projects: vec![p],
            ..Snapshot::default()
        };
        assert_eq!(check(&snapshot, now()), check(&snapshot, now()));
    }

    #[test]
    fn rule_ids_serialize_stably() {
        for rule in [
            Rule::ActiveProjectMustHaveNextActionOrWaitingFor,
            Rule::InboxItemClarifiedWithin48h,
            Rule::ActionReviewedWithin30Days,
        ] {
            let json = serde_json::to_string(&rule).unwrap();
            assert_eq!(json, format!("\"{}\"", rule.id()));
        }
    }
}
