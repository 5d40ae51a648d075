//! `tend project`: multi-step outcomes.

use clap::Subcommand;
use jiff::Timestamp;

use tend::config::Config;
use tend::model::{ProjectStatus, Snapshot};
use tend::state;
use tend::storage::Storage;

use super::format::format_project;
use super::inbox::add_project;
use super::{remove, resolve, short_id};

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Add a project. Prints the project ID.
    Add {
        title: String,

        /// What "done" looks like.
        #[arg(long)]
        outcome: String,

        /// Days between project reviews.
        #[arg(long)]
        review_interval: Option<u32>,

        /// First next action, with inferred defaults.
        #[arg(long)]
        next: Option<String>,
    },

    /// List projects.
    List {
        /// Include completed projects.
        #[arg(long)]
        all: bool,

        /// Only projects with this status.
        #[arg(long)]
        status: Option<ProjectStatus>,
    },

    /// Move a project to a new status: active, stalled, someday, completed.
    Status {
        project: String,
        status: ProjectStatus,
    },

    /// Record that a project was reviewed.
    Review { project: String },

    /// Delete a project. Its actions and waiting-fors stay, unattached.
    Delete { project: String },
}

pub(super) fn run(
    config: &Config,
    storage: &Storage,
    snapshot: &Snapshot,
    command: ProjectCommand,
    now: Timestamp,
) -> Result<(), String> {
    match command {
        ProjectCommand::Add {
            title,
            outcome,
            review_interval,
            next,
        } => add_project(
            config,
            storage,
            snapshot,
            &title,
            outcome,
            review_interval,
            next,
            now,
        ),
        ProjectCommand::List { all, status } => cmd_list(snapshot, all, status, now),
        ProjectCommand::Status { project, status } => {
            cmd_status(storage, snapshot, &project, status, now)
        }
        ProjectCommand::Review { project } => cmd_review(storage, snapshot, &project, now),
        ProjectCommand::Delete { project } => cmd_delete(storage, snapshot, &project),
    }
}

fn cmd_list(
    snapshot: &Snapshot,
    all: bool,
    status: Option<ProjectStatus>,
    now: Timestamp,
) -> Result<(), String> {
    let shown: Vec<_> = snapshot
        .projects
        .iter()
        .filter(|p| match status {
            Some(s) => p.status == s,
            None => all || p.status != ProjectStatus::Completed,
        })
        .collect();

    if shown.is_empty() {
        println!("No projects");
        return Ok(());
    }

    for project in shown {
        let mut line = format_project(project, snapshot, now);
        if state::should_stall(project, snapshot, now) {
            line.push_str("  ! no next action");
        }
        println!("{line}");
    }
    Ok(())
}

fn cmd_status(
    storage: &Storage,
    snapshot: &Snapshot,
    reference: &str,
    status: ProjectStatus,
    now: Timestamp,
) -> Result<(), String> {
    let index = resolve(&snapshot.projects, reference, "project")?;
    let project = &snapshot.projects[index];

    let allowed = match status {
        ProjectStatus::Active => state::can_activate(project),
        ProjectStatus::Completed => state::can_complete(project),
        ProjectStatus::Someday => state::can_defer(project),
        ProjectStatus::Stalled => project.status == ProjectStatus::Active,
    };
    if !allowed {
        return Err(format!(
            "cannot move project {} from {} to {status}",
            short_id(project.id),
            project.status
        ));
    }

    let mut projects = snapshot.projects.clone();
    projects[index] = project.with_status(status, now);
    storage
        .save_projects(&projects)
        .map_err(|e| format!("failed to save project: {e}"))?;
    tracing::info!(id = %project.id, from = %project.status, to = %status, "changed project status");

    eprintln!("Project '{}' is now {status}", project.title);
    Ok(())
}

fn cmd_review(
    storage: &Storage,
    snapshot: &Snapshot,
    reference: &str,
    now: Timestamp,
) -> Result<(), String> {
    let index = resolve(&snapshot.projects, reference, "project")?;
    let mut projects = snapshot.projects.clone();
    projects[index] = projects[index].mark_reviewed(now);

    storage
        .save_projects(&projects)
        .map_err(|e| format!("failed to save project: {e}"))?;
    tracing::info!(id = %projects[index].id, "reviewed project");

    eprintln!("Reviewed: {}", projects[index].title);
    Ok(())
}

fn cmd_delete(storage: &Storage, snapshot: &Snapshot, reference: &str) -> Result<(), String> {
    let (projects, removed) = remove(&snapshot.projects, reference, "project")?;
    storage
        .save_projects(&projects)
        .map_err(|e| format!("failed to save projects: {e}"))?;

    let actions = snapshot
        .next_actions
        .iter()
        .filter(|a| a.project_id == Some(removed.id))
        .count();
    let waiting = snapshot
        .waiting_for
        .iter()
        .filter(|w| w.project_id == Some(removed.id))
        .count();
    tracing::info!(id = %removed.id, actions, waiting, "deleted project");

    eprintln!("Deleted: {}", removed.title);
    if actions + waiting > 0 {
        eprintln!("{actions} action(s) and {waiting} waiting-for(s) still point at it");
    }
    Ok(())
}
