//! `tend review`: the weekly review ritual.

use clap::Subcommand;
use jiff::Timestamp;

use tend::model::{ReviewStep, Snapshot, WeeklyReview};
use tend::state::{self, ReviewHealth};
use tend::storage::Storage;

use super::format::{format_age, format_timestamp};
use super::short_id;

#[derive(Debug, Subcommand)]
pub enum ReviewCommand {
    /// Begin a weekly review.
    Start,

    /// Log a step of the review in progress.
    ///
    /// Steps: empty-inbox, review-projects, check-waiting-for,
    /// review-calendar-past, review-calendar-future, review-someday-maybe.
    Step { step: ReviewStep },

    /// Finish the review in progress.
    Finish {
        /// Finish even if some steps were skipped.
        #[arg(long)]
        force: bool,
    },

    /// Show review health and the review in progress.
    Status,
}

pub(super) fn run(
    storage: &Storage,
    snapshot: &Snapshot,
    command: ReviewCommand,
    now: Timestamp,
) -> Result<(), String> {
    match command {
        ReviewCommand::Start => cmd_start(storage, snapshot, now),
        ReviewCommand::Step { step } => cmd_step(storage, snapshot, step, now),
        ReviewCommand::Finish { force } => cmd_finish(storage, snapshot, force, now),
        ReviewCommand::Status => cmd_status(snapshot, now),
    }
}

/// Index of the unfinished review, if one is open.
fn in_progress(reviews: &[WeeklyReview]) -> Option<usize> {
    reviews.iter().rposition(|r| r.completed_at.is_none())
}

fn cmd_start(storage: &Storage, snapshot: &Snapshot, now: Timestamp) -> Result<(), String> {
    if let Some(index) = in_progress(&snapshot.weekly_reviews) {
        return Err(format!(
            "review {} is already in progress",
            short_id(snapshot.weekly_reviews[index].id)
        ));
    }

    let review = WeeklyReview::start(now);
    let mut reviews = snapshot.weekly_reviews.clone();
    reviews.push(review.clone());
    storage
        .save_weekly_reviews(&reviews)
        .map_err(|e| format!("failed to save review: {e}"))?;
    tracing::info!(id = %review.id, "started weekly review");

    println!("{}", review.id);
    eprintln!("Next: {}", step_hint(ReviewStep::ALL[0], snapshot, now));
    Ok(())
}

fn cmd_step(
    storage: &Storage,
    snapshot: &Snapshot,
    step: ReviewStep,
    now: Timestamp,
) -> Result<(), String> {
    let index = in_progress(&snapshot.weekly_reviews)
        .ok_or("no review in progress: run `tend review start`")?;

    let mut reviews = snapshot.weekly_reviews.clone();
    reviews[index] = reviews[index].complete_step(step);
    storage
        .save_weekly_reviews(&reviews)
        .map_err(|e| format!("failed to save review: {e}"))?;
    tracing::info!(id = %reviews[index].id, step = step.id(), "logged review step");

    let remaining = reviews[index].remaining_steps();
    eprintln!("Logged: {step}");
    match remaining.first() {
        Some(next) => eprintln!("Next: {}", step_hint(*next, snapshot, now)),
        None => eprintln!("All steps logged. Run `tend review finish`."),
    }
    Ok(())
}

fn cmd_finish(
    storage: &Storage,
    snapshot: &Snapshot,
    force: bool,
    now: Timestamp,
) -> Result<(), String> {
    let index = in_progress(&snapshot.weekly_reviews).ok_or("no review in progress")?;

    let remaining = snapshot.weekly_reviews[index].remaining_steps();
    if !remaining.is_empty() && !force {
        let ids: Vec<&str> = remaining.iter().map(|s| s.id()).collect();
        return Err(format!(
            "steps not logged: {} (use --force to finish anyway)",
            ids.join(", ")
        ));
    }

    let mut reviews = snapshot.weekly_reviews.clone();
    reviews[index] = reviews[index].finish(now);
    storage
        .save_weekly_reviews(&reviews)
        .map_err(|e| format!("failed to save review: {e}"))?;
    tracing::info!(
        id = %reviews[index].id,
        skipped = remaining.len(),
        "finished weekly review"
    );

    eprintln!("Weekly review done");
    Ok(())
}

fn cmd_status(snapshot: &Snapshot, now: Timestamp) -> Result<(), String> {
    let reviews = &snapshot.weekly_reviews;

    let health = match state::review_health(reviews, now) {
        ReviewHealth::Healthy => "healthy",
        ReviewHealth::Overdue if state::review_critically_overdue(reviews, now) => {
            "critically overdue"
        }
        ReviewHealth::Overdue => "overdue",
    };
    println!("Health: {health}");

    match state::last_completed_review(reviews).and_then(|r| r.completed_at) {
        Some(at) => println!(
            "Last review: {} ({} ago)",
            format_timestamp(at),
            format_age(at, now)
        ),
        None => println!("Last review: never"),
    }

    if let Some(index) = in_progress(reviews) {
        let review = &reviews[index];
        println!(
            "In progress since {}: {}/{} steps",
            format_timestamp(review.started_at),
            review.steps_completed.len(),
            ReviewStep::ALL.len()
        );
        for step in review.remaining_steps() {
            println!("  - {}", step_hint(step, snapshot, now));
        }
    }
    Ok(())
}

/// A step's label with what it currently involves.
fn step_hint(step: ReviewStep, snapshot: &Snapshot, now: Timestamp) -> String {
    let detail = match step {
        ReviewStep::EmptyInbox => {
            let n = snapshot.inbox_items.iter().filter(|i| i.can_clarify()).count();
            format!("{n} to clarify")
        }
        ReviewStep::ReviewProjects => {
            let n = snapshot
                .projects
                .iter()
                .filter(|p| state::should_stall(p, snapshot, now))
                .count();
            format!("{} projects, {n} without a next action", snapshot.projects.len())
        }
        ReviewStep::CheckWaitingFor => {
            let n = snapshot
                .waiting_for
                .iter()
                .filter(|w| state::waiting_state(w, now) == state::WaitingState::Escalated)
                .count();
            format!("{n} escalated")
        }
        ReviewStep::ReviewCalendarPast
        | ReviewStep::ReviewCalendarFuture
        | ReviewStep::ReviewSomedayMaybe => return format!("{step} ({})", step.id()),
    };
    format!("{step} ({}): {detail}", step.id())
}
