//! `tend action`: next actions.

use clap::{Args, Subcommand};
use jiff::Timestamp;

use tend::infer;
use tend::model::{Context, Energy, NewNextAction, NextAction, Snapshot};
use tend::storage::Storage;

use super::format::{format_action, format_minutes};
use super::{parse_when, remove, resolve, resolve_project, short_id};

#[derive(Debug, Subcommand)]
pub enum ActionCommand {
    /// Add a next action. Unspecified fields are inferred from the title.
    Add {
        title: String,

        #[command(flatten)]
        options: ActionOptions,
    },

    /// List next actions.
    List {
        /// Include completed actions.
        #[arg(long)]
        all: bool,

        /// Only actions in this context.
        #[arg(long)]
        context: Option<Context>,

        /// Only actions belonging to this project.
        #[arg(long)]
        project: Option<String>,
    },

    /// Mark an action done.
    Done { action: String },

    /// Reopen a completed action.
    Undo { action: String },

    /// Record that an action was looked at and is still right.
    Review { action: String },

    /// Change an action's details. Unspecified fields keep their values.
    Edit {
        action: String,

        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        options: ActionOptions,

        /// Remove the due date.
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,

        /// Remove the start date.
        #[arg(long, conflicts_with = "start")]
        clear_start: bool,
    },

    /// Delete an action.
    Delete { action: String },
}

/// Fields shared by `action add`, `action edit` and `clarify <id> action`.
#[derive(Debug, Args)]
pub struct ActionOptions {
    /// Context tag, e.g. `@calls` or `calls`.
    #[arg(long)]
    pub context: Option<Context>,

    /// Energy required: 1|low, 2|medium, 3|high.
    #[arg(long)]
    pub energy: Option<Energy>,

    /// Time estimate in minutes.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub minutes: Option<u32>,

    /// Project ID or prefix. Defaults to the best title match, if any.
    #[arg(long)]
    pub project: Option<String>,

    /// Don't attach to any project, even a matching one.
    #[arg(long, conflicts_with = "project")]
    pub no_project: bool,

    /// Due date.
    #[arg(long)]
    pub due: Option<String>,

    /// Hide the action until this date.
    #[arg(long)]
    pub start: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl ActionOptions {
    /// Fill every unspecified field from inference on `title`.
    pub(super) fn build(
        self,
        title: &str,
        snapshot: &Snapshot,
        now: Timestamp,
    ) -> Result<NewNextAction, String> {
        let suggestion = infer::suggest(title, &snapshot.projects);
        if suggestion.next_action_title.is_empty() {
            return Err("action title cannot be empty".into());
        }

        let project_id = if self.no_project {
            None
        } else if self.project.is_some() {
            resolve_project(snapshot, self.project.as_deref())?
        } else {
            suggestion.project.map(|m| m.id)
        };

        Ok(NewNextAction {
            title: suggestion.next_action_title,
            context: self.context.unwrap_or(suggestion.context),
            energy: self.energy.unwrap_or(suggestion.energy),
            time_estimate: self
                .minutes
                .filter(|&m| m > 0)
                .unwrap_or(suggestion.time_estimate),
            project_id,
            due_date: self.due.map(|d| parse_when(&d, now)).transpose()?,
            start_date: self.start.map(|d| parse_when(&d, now)).transpose()?,
            notes: self.notes,
        })
    }

    /// Overlay the given fields on an existing action. Nothing is inferred.
    pub(super) fn apply(
        self,
        current: &NextAction,
        title: Option<String>,
        clear_due: bool,
        clear_start: bool,
        snapshot: &Snapshot,
        now: Timestamp,
    ) -> Result<NewNextAction, String> {
        let title = title.map_or_else(|| current.title.clone(), |t| t.trim().to_string());
        if title.is_empty() {
            return Err("action title cannot be empty".into());
        }

        let project_id = if self.no_project {
            None
        } else if self.project.is_some() {
            resolve_project(snapshot, self.project.as_deref())?
        } else {
            current.project_id
        };

        let due_date = match (clear_due, self.due) {
            (true, _) => None,
            (false, Some(d)) => Some(parse_when(&d, now)?),
            (false, None) => current.due_date,
        };
        let start_date = match (clear_start, self.start) {
            (true, _) => None,
            (false, Some(d)) => Some(parse_when(&d, now)?),
            (false, None) => current.start_date,
        };

        Ok(NewNextAction {
            title,
            context: self.context.unwrap_or(current.context),
            energy: self.energy.unwrap_or(current.energy),
            time_estimate: self
                .minutes
                .filter(|&m| m > 0)
                .unwrap_or(current.time_estimate),
            project_id,
            due_date,
            start_date,
            notes: self.notes.or_else(|| current.notes.clone()),
        })
    }
}

pub(super) fn run(
    storage: &Storage,
    snapshot: &Snapshot,
    command: ActionCommand,
    now: Timestamp,
) -> Result<(), String> {
    match command {
        ActionCommand::Add { title, options } => {
            let input = options.build(&title, snapshot, now)?;
            cmd_add(storage, snapshot, input, now)
        }
        ActionCommand::List {
            all,
            context,
            project,
        } => cmd_list(snapshot, all, context, project.as_deref(), now),
        ActionCommand::Done { action } => cmd_done(storage, snapshot, &action, now),
        ActionCommand::Undo { action } => cmd_undo(storage, snapshot, &action),
        ActionCommand::Review { action } => cmd_review(storage, snapshot, &action, now),
        ActionCommand::Edit {
            action,
            title,
            options,
            clear_due,
            clear_start,
        } => {
            let index = resolve(&snapshot.next_actions, &action, "action")?;
            let current = &snapshot.next_actions[index];
            let input = options.apply(current, title, clear_due, clear_start, snapshot, now)?;
            cmd_edit(storage, snapshot, index, input)
        }
        ActionCommand::Delete { action } => cmd_delete(storage, snapshot, &action),
    }
}

/// Append a new action and print its ID.
pub(super) fn cmd_add(
    storage: &Storage,
    snapshot: &Snapshot,
    input: NewNextAction,
    now: Timestamp,
) -> Result<(), String> {
    let action = NextAction::new(input, now);

    let mut actions = snapshot.next_actions.clone();
    actions.push(action.clone());
    storage
        .save_next_actions(&actions)
        .map_err(|e| format!("failed to save action: {e}"))?;
    tracing::info!(id = %action.id, context = %action.context, "added next action");

    println!("{}", action.id);
    let project = action
        .project_id
        .and_then(|id| snapshot.project(id))
        .map_or_else(String::new, |p| format!(", project: {}", p.title));
    eprintln!(
        "Added {} ({}, {}, {}{project})",
        short_id(action.id),
        action.context,
        action.energy.label(),
        format_minutes(action.time_estimate),
    );
    Ok(())
}

fn cmd_list(
    snapshot: &Snapshot,
    all: bool,
    context: Option<Context>,
    project: Option<&str>,
    now: Timestamp,
) -> Result<(), String> {
    let project_id = resolve_project(snapshot, project)?;

    let shown: Vec<_> = snapshot
        .next_actions
        .iter()
        .filter(|a| all || a.completed_at.is_none())
        .filter(|a| context.is_none_or(|c| a.context == c))
        .filter(|a| project_id.is_none() || a.project_id == project_id)
        .collect();

    if shown.is_empty() {
        println!("No actions");
        return Ok(());
    }

    for action in shown {
        println!("{}", format_action(action, snapshot, now));
    }
    Ok(())
}

fn cmd_done(
    storage: &Storage,
    snapshot: &Snapshot,
    reference: &str,
    now: Timestamp,
) -> Result<(), String> {
    let index = resolve(&snapshot.next_actions, reference, "action")?;
    let mut actions = snapshot.next_actions.clone();
    let action = actions[index].complete(now);
    actions[index] = action.clone();

    storage
        .save_next_actions(&actions)
        .map_err(|e| format!("failed to save action: {e}"))?;
    tracing::info!(id = %action.id, "completed next action");

    eprintln!("Done: {}", action.title);

    // A finished action may leave its project without any forward motion.
    if let Some(project) = action.project_id.and_then(|id| snapshot.project(id)) {
        let after = Snapshot {
            next_actions: actions,
            ..snapshot.clone()
        };
        if tend::state::should_stall(project, &after, now) {
            eprintln!(
                "Project '{}' has no next action left. Add one or mark it stalled.",
                project.title
            );
        }
    }
    Ok(())
}

fn cmd_undo(storage: &Storage, snapshot: &Snapshot, reference: &str) -> Result<(), String> {
    let index = resolve(&snapshot.next_actions, reference, "action")?;
    let mut actions = snapshot.next_actions.clone();
    if actions[index].completed_at.is_none() {
        return Err(format!("action {} is not completed", short_id(actions[index].id)));
    }
    actions[index] = actions[index].uncomplete();

    storage
        .save_next_actions(&actions)
        .map_err(|e| format!("failed to save action: {e}"))?;
    tracing::info!(id = %actions[index].id, "reopened next action");

    eprintln!("Reopened: {}", actions[index].title);
    Ok(())
}

fn cmd_review(
    storage: &Storage,
    snapshot: &Snapshot,
    reference: &str,
    now: Timestamp,
) -> Result<(), String> {
    let index = resolve(&snapshot.next_actions, reference, "action")?;
    let mut actions = snapshot.next_actions.clone();
    actions[index] = actions[index].mark_reviewed(now);

    storage
        .save_next_actions(&actions)
        .map_err(|e| format!("failed to save action: {e}"))?;
    tracing::info!(id = %actions[index].id, "reviewed next action");

    eprintln!("Reviewed: {}", actions[index].title);
    Ok(())
}

fn cmd_edit(
    storage: &Storage,
    snapshot: &Snapshot,
    index: usize,
    input: NewNextAction,
) -> Result<(), String> {
    let mut actions = snapshot.next_actions.clone();
    actions[index] = actions[index].with_details(input);

    storage
        .save_next_actions(&actions)
        .map_err(|e| format!("failed to save action: {e}"))?;
    tracing::info!(id = %actions[index].id, "edited next action");

    eprintln!("Updated: {}", actions[index].title);
    Ok(())
}

fn cmd_delete(storage: &Storage, snapshot: &Snapshot, reference: &str) -> Result<(), String> {
    let (actions, removed) = remove(&snapshot.next_actions, reference, "action")?;
    storage
        .save_next_actions(&actions)
        .map_err(|e| format!("failed to save actions: {e}"))?;
    tracing::info!(id = %removed.id, "deleted next action");

    eprintln!("Deleted: {}", removed.title);
    Ok(())
}
