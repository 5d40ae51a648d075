//! `tend engage`: what to do right now.

use std::path::PathBuf;

use clap::Args;
use jiff::{Timestamp, tz::TimeZone};

use tend::calendar;
use tend::config::Config;
use tend::engage::{self, Situation};
use tend::model::{Context, Energy, Snapshot};

use super::format::{format_minutes, format_ranked};

#[derive(Debug, Args)]
pub struct EngageArgs {
    /// Where you are. Repeat for several. Defaults to `engage.contexts`.
    #[arg(long = "context", short = 'c')]
    pub contexts: Vec<Context>,

    /// Energy available: 1|low, 2|medium, 3|high.
    #[arg(long, short = 'e')]
    pub energy: Option<Energy>,

    /// Minutes available.
    #[arg(
        long,
        short = 'm',
        conflicts_with = "calendar",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub minutes: Option<u32>,

    /// JSON calendar feed; free minutes run until the next event today.
    #[arg(long)]
    pub calendar: Option<PathBuf>,

    /// How many actions to show.
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Print the ranked list as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Build the situation from flags, falling back to config defaults.
fn situation(config: &Config, args: &EngageArgs, now: Timestamp) -> Result<Situation, String> {
    let contexts = if args.contexts.is_empty() {
        config.engage.contexts.clone()
    } else {
        args.contexts.clone()
    };

    let available_minutes = match (&args.minutes, &args.calendar) {
        (Some(minutes), _) => *minutes,
        (None, Some(path)) => {
            let events = calendar::load_events(path).map_err(|e| format!("{}: {e}", path.display()))?;
            let horizon = now
                .to_zoned(TimeZone::system())
                .end_of_day()
                .map_err(|e| format!("failed to compute end of day: {e}"))?
                .timestamp();
            calendar::suggest_available_minutes(&events, now, horizon)
        }
        (None, None) => config.engage.available_minutes,
    };

    Ok(Situation {
        contexts,
        energy: args.energy.unwrap_or(config.engage.energy),
        available_minutes,
    })
}

pub(super) fn cmd_engage(
    config: &Config,
    snapshot: &Snapshot,
    args: &EngageArgs,
    now: Timestamp,
) -> Result<(), String> {
    let situation = situation(config, args, now)?;
    let limit = args.limit.unwrap_or(config.engage.limit);

    let mut ranked = engage::rank(&situation, snapshot, now);
    let eligible = ranked.len();
    ranked.truncate(limit);
    tracing::info!(eligible, shown = ranked.len(), "ranked next actions");

    if args.json {
        let out = serde_json::to_string_pretty(&ranked)
            .map_err(|e| format!("failed to serialize ranking: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    let contexts: Vec<String> = situation.contexts.iter().map(ToString::to_string).collect();
    eprintln!(
        "{} | energy {} | {} free",
        contexts.join(" "),
        situation.energy.label(),
        format_minutes(situation.available_minutes)
    );

    if ranked.is_empty() {
        println!("Nothing fits right now");
        return Ok(());
    }

    for (i, entry) in ranked.iter().enumerate() {
        println!("{}", format_ranked(i + 1, entry, snapshot));
    }
    if eligible > ranked.len() {
        eprintln!("({} more)", eligible - ranked.len());
    }
    Ok(())
}
