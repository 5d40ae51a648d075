//! CLI interface for tend.
//!
//! Each subcommand is non-interactive: arguments in, text out. Every
//! command loads the whole snapshot, applies one transition, and saves
//! back the collections it changed.
//!
//! Record ids accept a full UUID or an unambiguous prefix (e.g. `a3b`).

mod actions;
mod check;
mod engage;
mod format;
mod inbox;
mod projects;
mod review;
mod waiting;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jiff::{Timestamp, civil::Date, tz::TimeZone};
use uuid::Uuid;

use tend::config::Config;
use tend::model::Snapshot;
use tend::storage::{Record, Storage};

pub use actions::ActionCommand;
pub use engage::EngageArgs;
pub use inbox::{ClarifyAs, InboxCommand};
pub use projects::ProjectCommand;
pub use review::ReviewCommand;
pub use waiting::WaitingCommand;

/// tend: capture, clarify, and engage.
#[derive(Debug, Parser)]
#[command(name = "tend", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Data directory. Defaults to `data-dir` from the config, then `~/.tend/`.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow:
  1. tend capture "Call John about the proposal, 2h"
  2. tend inbox                      → lists unclarified items (e.g. 3f9a1c02)
  3. tend infer "Call John about the proposal, 2h"
  4. tend clarify 3f9 action         → accepts inferred context, energy, duration
  5. tend engage --context calls --energy 2 --minutes 45
  6. tend check                      → audit the system

Every collection has a `delete` subcommand (`tend inbox delete <id>`,
`tend action delete <id>`, ...). Deleting a project leaves its actions
and waiting-fors in place, unattached.

Dates accept RFC 3339 timestamps, plain dates (2026-03-01, local midnight),
or offsets from now (+3d, +12h)."#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Capture a thought into the inbox. Prints the item ID.
    Capture {
        /// Whatever is on your mind.
        text: String,
    },

    /// List inbox items, or delete one.
    Inbox {
        /// Include clarified items.
        #[arg(long)]
        all: bool,

        #[command(subcommand)]
        command: Option<InboxCommand>,
    },

    /// Clarify an inbox item into an action, waiting-for, project, or disposition.
    Clarify {
        /// Inbox item ID: full UUID or unambiguous prefix.
        item: String,

        #[command(subcommand)]
        outcome: ClarifyAs,
    },

    /// Show the defaults tend would suggest when clarifying some text.
    Infer {
        text: String,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Manage next actions.
    Action {
        #[command(subcommand)]
        command: ActionCommand,
    },

    /// Manage projects.
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Manage waiting-for items.
    Waiting {
        #[command(subcommand)]
        command: WaitingCommand,
    },

    /// Run the weekly review.
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },

    /// Rank what to do right now.
    Engage(EngageArgs),

    /// Audit the system for methodology violations.
    ///
    /// Exits non-zero when hard violations are found.
    Check {
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Resolve the data directory: flag, then config, then `~/.tend/`.
    pub fn resolve_data_dir(&self, config: &Config) -> Result<PathBuf, String> {
        self.data_dir
            .clone()
            .or_else(|| config.data_dir.clone())
            .or_else(Storage::default_dir)
            .ok_or_else(|| "could not determine home directory; pass --data-dir".to_string())
    }
}

/// Run the parsed command, returning an error message on failure.
pub fn run(command: Command, config: &Config, storage: &Storage) -> Result<(), String> {
    let now = Timestamp::now();
    let snapshot = storage
        .load()
        .map_err(|e| format!("failed to load data: {e}"))?;
    tracing::debug!(command = ?command, "running command");

    match command {
        Command::Capture { text } => inbox::cmd_capture(storage, &snapshot, &text, now),
        Command::Inbox { all, command } => match command {
            None => inbox::cmd_list(&snapshot, all, now),
            Some(InboxCommand::Delete { item }) => inbox::cmd_delete(storage, &snapshot, &item),
        },
        Command::Clarify { item, outcome } => {
            inbox::cmd_clarify(config, storage, &snapshot, &item, outcome, now)
        }
        Command::Infer { text, json } => inbox::cmd_infer(&snapshot, &text, json),
        Command::Action { command } => actions::run(storage, &snapshot, command, now),
        Command::Project { command } => projects::run(config, storage, &snapshot, command, now),
        Command::Waiting { command } => waiting::run(config, storage, &snapshot, command, now),
        Command::Review { command } => review::run(storage, &snapshot, command, now),
        Command::Engage(args) => engage::cmd_engage(config, &snapshot, &args, now),
        Command::Check { json } => check::cmd_check(&snapshot, json, now),
    }
}

/// Resolve a reference (full UUID or unambiguous prefix) to an index into `records`.
fn resolve<T: Record>(records: &[T], reference: &str, kind: &str) -> Result<usize, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| format!("{kind} not found: {id}"));
    }

    let reference = reference.to_lowercase();
    let matches: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.id().to_string().starts_with(&reference))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no {kind} matching '{reference}'")),
        [index] => Ok(*index),
        many => {
            let ids: Vec<String> = many.iter().map(|&i| short_id(records[i].id())).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} {kind}s: {}",
                many.len(),
                ids.join(", ")
            ))
        }
    }
}

/// Remove one record by reference, returning what is left and what was removed.
fn remove<T: Record + Clone>(
    records: &[T],
    reference: &str,
    kind: &str,
) -> Result<(Vec<T>, T), String> {
    let index = resolve(records, reference, kind)?;
    let mut remaining = records.to_vec();
    let removed = remaining.remove(index);
    Ok((remaining, removed))
}

/// Resolve an optional project reference to a project id.
fn resolve_project(snapshot: &Snapshot, reference: Option<&str>) -> Result<Option<Uuid>, String> {
    reference
        .map(|r| resolve(&snapshot.projects, r, "project").map(|i| snapshot.projects[i].id))
        .transpose()
}

/// The first eight hex digits, enough to address a record.
fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Parse a date argument relative to `now`.
///
/// Accepts an RFC 3339 timestamp, a civil date (local midnight), or an
/// offset like `+3d` / `+12h`.
fn parse_when(input: &str, now: Timestamp) -> Result<Timestamp, String> {
    let input = input.trim();

    if let Some(offset) = input.strip_prefix('+') {
        let (number, unit_secs) = if let Some(days) = offset.strip_suffix('d') {
            (days, 86_400)
        } else if let Some(hours) = offset.strip_suffix('h') {
            (hours, 3_600)
        } else {
            return Err(format!("invalid offset '{input}': use +<N>d or +<N>h"));
        };
        let n: i64 = number
            .parse()
            .map_err(|e| format!("invalid offset '{input}': {e}"))?;
        return Timestamp::from_second(now.as_second().saturating_add(n.saturating_mul(unit_secs)))
            .map_err(|e| format!("offset '{input}' out of range: {e}"));
    }

    if let Ok(ts) = input.parse::<Timestamp>() {
        return Ok(ts);
    }

    let date: Date = input
        .parse()
        .map_err(|e| format!("invalid date '{input}': {e}"))?;
    date.to_zoned(TimeZone::system())
        .map(|z| z.timestamp())
        .map_err(|e| format!("invalid date '{input}': {e}"))
}
