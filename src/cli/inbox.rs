//! `tend capture`, `tend inbox`, `tend clarify`, `tend infer`.

use clap::{Args, Subcommand};
use jiff::Timestamp;

use tend::config::Config;
use tend::infer;
use tend::integrity::INBOX_MAX_AGE_HOURS;
use tend::model::{Disposition, InboxItem, NewProject, NewWaitingFor, Project, Snapshot, WaitingFor};
use tend::storage::Storage;

use super::actions::{self, ActionOptions};
use super::format::{format_age, format_minutes};
use super::{parse_when, remove, resolve, resolve_project, short_id};

#[derive(Debug, Subcommand)]
pub enum InboxCommand {
    /// Delete an inbox item outright, clarified or not.
    Delete { item: String },
}

/// What an inbox item turns into.
#[derive(Debug, Subcommand)]
pub enum ClarifyAs {
    /// Not worth keeping.
    Trash,
    /// Maybe later. Kept out of every active list.
    Someday,
    /// Worth keeping, nothing to do.
    Reference,

    /// A single next action. Unspecified fields are inferred from the item.
    Action {
        /// Title for the action. Defaults to the captured text.
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        options: ActionOptions,
    },

    /// Someone else owes you this.
    Waiting {
        /// Defaults to the captured text.
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        options: WaitingOptions,
    },

    /// A multi-step outcome.
    Project {
        /// What "done" looks like.
        #[arg(long)]
        outcome: String,

        /// Project title. Defaults to the captured text.
        #[arg(long)]
        title: Option<String>,

        /// Days between project reviews.
        #[arg(long)]
        review_interval: Option<u32>,

        /// First next action for the new project, with inferred defaults.
        #[arg(long)]
        next: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct WaitingOptions {
    /// Who owes it.
    #[arg(long)]
    pub owner: String,

    #[arg(long)]
    pub expected_by: Option<String>,

    /// Project ID or prefix.
    #[arg(long)]
    pub project: Option<String>,

    /// Days between follow-ups.
    #[arg(long)]
    pub followup_interval: Option<u32>,

    #[arg(long)]
    pub notes: Option<String>,
}

pub(super) fn cmd_capture(
    storage: &Storage,
    snapshot: &Snapshot,
    text: &str,
    now: Timestamp,
) -> Result<(), String> {
    let item = InboxItem::capture(text, now);
    if item.content.is_empty() {
        return Err("nothing to capture".into());
    }

    let mut items = snapshot.inbox_items.clone();
    items.push(item.clone());
    storage
        .save_inbox_items(&items)
        .map_err(|e| format!("failed to save inbox item: {e}"))?;
    tracing::info!(id = %item.id, "captured inbox item");

    println!("{}", item.id);
    Ok(())
}

pub(super) fn cmd_list(snapshot: &Snapshot, all: bool, now: Timestamp) -> Result<(), String> {
    let shown: Vec<&InboxItem> = snapshot
        .inbox_items
        .iter()
        .filter(|i| all || i.can_clarify())
        .collect();

    if shown.is_empty() {
        println!("Inbox zero");
        return Ok(());
    }

    for item in shown {
        let status = match (item.clarified, item.disposition) {
            (false, _) => {
                let hours = (now.as_second() - item.captured_at.as_second()) / 3_600;
                if hours > INBOX_MAX_AGE_HOURS { "stale" } else { "new" }
            }
            (true, Some(d)) => d.as_str(),
            (true, None) => "clarified",
        };
        println!(
            "{}  {:<9}  {:>4}  {}",
            short_id(item.id),
            status,
            format_age(item.captured_at, now),
            item.content
        );
    }
    Ok(())
}

pub(super) fn cmd_delete(storage: &Storage, snapshot: &Snapshot, reference: &str) -> Result<(), String> {
    let (items, removed) = remove(&snapshot.inbox_items, reference, "inbox item")?;
    storage
        .save_inbox_items(&items)
        .map_err(|e| format!("failed to save inbox: {e}"))?;
    tracing::info!(id = %removed.id, "deleted inbox item");

    eprintln!("Deleted: {}", removed.content);
    Ok(())
}

pub(super) fn cmd_infer(snapshot: &Snapshot, text: &str, json: bool) -> Result<(), String> {
    let suggestion = infer::suggest(text, &snapshot.projects);

    if json {
        let out = serde_json::to_string_pretty(&suggestion)
            .map_err(|e| format!("failed to serialize suggestion: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    println!("title:    {}", suggestion.next_action_title);
    println!("context:  {}", suggestion.context);
    println!("energy:   {}", suggestion.energy.label());
    println!("estimate: {}", format_minutes(suggestion.time_estimate));
    match &suggestion.project {
        Some(m) => println!("project:  {} ({}, match {:.2})", m.title, short_id(m.id), m.score),
        None => println!("project:  none"),
    }
    Ok(())
}

pub(super) fn cmd_clarify(
    config: &Config,
    storage: &Storage,
    snapshot: &Snapshot,
    reference: &str,
    outcome: ClarifyAs,
    now: Timestamp,
) -> Result<(), String> {
    let index = resolve(&snapshot.inbox_items, reference, "inbox item")?;
    let item = &snapshot.inbox_items[index];
    if !item.can_clarify() {
        return Err(format!("inbox item {} is already clarified", short_id(item.id)));
    }

    let disposition = match outcome {
        ClarifyAs::Trash => Some(Disposition::Trash),
        ClarifyAs::Someday => Some(Disposition::Someday),
        ClarifyAs::Reference => Some(Disposition::Reference),
        ClarifyAs::Action { title, options } => {
            let title = title.unwrap_or_else(|| item.content.clone());
            let input = options.build(&title, snapshot, now)?;
            actions::cmd_add(storage, snapshot, input, now)?;
            None
        }
        ClarifyAs::Waiting { title, options } => {
            let title = title.unwrap_or_else(|| item.content.clone());
            add_waiting(config, storage, snapshot, &title, options, now)?;
            None
        }
        ClarifyAs::Project {
            outcome,
            title,
            review_interval,
            next,
        } => {
            let title = title.unwrap_or_else(|| item.content.clone());
            add_project(config, storage, snapshot, &title, outcome, review_interval, next, now)?;
            None
        }
    };

    let mut items = snapshot.inbox_items.clone();
    items[index] = items[index].clarify(disposition, now);
    storage
        .save_inbox_items(&items)
        .map_err(|e| format!("failed to save inbox item: {e}"))?;
    tracing::info!(id = %items[index].id, disposition = ?disposition, "clarified inbox item");

    match disposition {
        Some(d) => eprintln!("Clarified {} as {d}", short_id(items[index].id)),
        None => eprintln!("Clarified {}", short_id(items[index].id)),
    }
    Ok(())
}

/// Create a waiting-for and print its ID.
pub(super) fn add_waiting(
    config: &Config,
    storage: &Storage,
    snapshot: &Snapshot,
    title: &str,
    options: WaitingOptions,
    now: Timestamp,
) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("waiting-for title cannot be empty".into());
    }

    let item = WaitingFor::new(
        NewWaitingFor {
            title: title.to_string(),
            owner: options.owner,
            expected_by: options
                .expected_by
                .map(|d| parse_when(&d, now))
                .transpose()?,
            project_id: resolve_project(snapshot, options.project.as_deref())?,
            followup_interval: Some(
                options
                    .followup_interval
                    .unwrap_or(config.default_followup_interval),
            ),
            notes: options.notes,
        },
        now,
    );

    let mut items = snapshot.waiting_for.clone();
    items.push(item.clone());
    storage
        .save_waiting_for(&items)
        .map_err(|e| format!("failed to save waiting-for: {e}"))?;
    tracing::info!(id = %item.id, owner = %item.owner, "added waiting-for");

    println!("{}", item.id);
    Ok(())
}

/// Create a project, optionally with its first next action.
#[allow(clippy::too_many_arguments)]
pub(super) fn add_project(
    config: &Config,
    storage: &Storage,
    snapshot: &Snapshot,
    title: &str,
    outcome: String,
    review_interval: Option<u32>,
    next: Option<String>,
    now: Timestamp,
) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("project title cannot be empty".into());
    }

    let project = Project::new(
        NewProject {
            title: title.to_string(),
            outcome_statement: outcome,
            review_interval: Some(review_interval.unwrap_or(config.default_review_interval)),
            notes: None,
        },
        now,
    );

    let mut projects = snapshot.projects.clone();
    projects.push(project.clone());
    storage
        .save_projects(&projects)
        .map_err(|e| format!("failed to save project: {e}"))?;
    tracing::info!(id = %project.id, "added project");

    println!("{}", project.id);

    match next {
        Some(next) => {
            let after = Snapshot {
                projects,
                ..snapshot.clone()
            };
            let options = ActionOptions {
                context: None,
                energy: None,
                minutes: None,
                project: Some(project.id.to_string()),
                no_project: false,
                due: None,
                start: None,
                notes: None,
            };
            let input = options.build(&next, &after, now)?;
            actions::cmd_add(storage, &after, input, now)?;
        }
        None => eprintln!(
            "Project {} has no next action yet: add one with `tend action add --project {}`",
            short_id(project.id),
            short_id(project.id)
        ),
    }
    Ok(())
}
