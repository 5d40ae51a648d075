//! `tend waiting`: things other people owe you.

use clap::Subcommand;
use jiff::Timestamp;

use tend::config::Config;
use tend::model::Snapshot;
use tend::state::{self, WaitingState};
use tend::storage::Storage;

use super::format::format_waiting;
use super::inbox::{WaitingOptions, add_waiting};
use super::{remove, resolve, short_id};

#[derive(Debug, Subcommand)]
pub enum WaitingCommand {
    /// Add a waiting-for item. Prints its ID.
    Add {
        title: String,

        #[command(flatten)]
        options: WaitingOptions,
    },

    /// List waiting-for items, escalated first.
    List {
        /// Include resolved items.
        #[arg(long)]
        all: bool,
    },

    /// Record a follow-up with the owner.
    FollowUp { item: String },

    /// Mark an item received.
    Resolve { item: String },

    /// Delete an item outright.
    Delete { item: String },
}

pub(super) fn run(
    config: &Config,
    storage: &Storage,
    snapshot: &Snapshot,
    command: WaitingCommand,
    now: Timestamp,
) -> Result<(), String> {
    match command {
        WaitingCommand::Add { title, options } => {
            add_waiting(config, storage, snapshot, &title, options, now)
        }
        WaitingCommand::List { all } => cmd_list(snapshot, all, now),
        WaitingCommand::FollowUp { item } => cmd_follow_up(storage, snapshot, &item, now),
        WaitingCommand::Resolve { item } => cmd_resolve(storage, snapshot, &item, now),
        WaitingCommand::Delete { item } => cmd_delete(storage, snapshot, &item),
    }
}

fn cmd_list(snapshot: &Snapshot, all: bool, now: Timestamp) -> Result<(), String> {
    let mut shown: Vec<_> = snapshot
        .waiting_for
        .iter()
        .map(|w| (state::waiting_state(w, now), w))
        .filter(|(s, _)| all || s.is_unresolved())
        .collect();

    if shown.is_empty() {
        println!("Nothing outstanding");
        return Ok(());
    }

    // Stable: escalated items first, otherwise stored order.
    shown.sort_by_key(|(s, _)| *s != WaitingState::Escalated);
    for (_, item) in shown {
        println!("{}", format_waiting(item, now));
    }
    Ok(())
}

fn cmd_follow_up(
    storage: &Storage,
    snapshot: &Snapshot,
    reference: &str,
    now: Timestamp,
) -> Result<(), String> {
    let index = resolve(&snapshot.waiting_for, reference, "waiting-for")?;
    let mut items = snapshot.waiting_for.clone();
    if items[index].resolved_at.is_some() {
        return Err(format!("waiting-for {} is already resolved", short_id(items[index].id)));
    }
    items[index] = items[index].mark_followed_up(now);

    storage
        .save_waiting_for(&items)
        .map_err(|e| format!("failed to save waiting-for: {e}"))?;
    tracing::info!(id = %items[index].id, "followed up waiting-for");

    eprintln!("Followed up with {}: {}", items[index].owner, items[index].title);
    Ok(())
}

fn cmd_resolve(
    storage: &Storage,
    snapshot: &Snapshot,
    reference: &str,
    now: Timestamp,
) -> Result<(), String> {
    let index = resolve(&snapshot.waiting_for, reference, "waiting-for")?;
    let mut items = snapshot.waiting_for.clone();
    items[index] = items[index].resolve(now);

    storage
        .save_waiting_for(&items)
        .map_err(|e| format!("failed to save waiting-for: {e}"))?;
    tracing::info!(id = %items[index].id, "resolved waiting-for");

    eprintln!("Resolved: {}", items[index].title);
    Ok(())
}

fn cmd_delete(storage: &Storage, snapshot: &Snapshot, reference: &str) -> Result<(), String> {
    let (items, removed) = remove(&snapshot.waiting_for, reference, "waiting-for")?;
    storage
        .save_waiting_for(&items)
        .map_err(|e| format!("failed to save waiting-for: {e}"))?;
    tracing::info!(id = %removed.id, "deleted waiting-for");

    eprintln!("Deleted: {}", removed.title);
    Ok(())
}
