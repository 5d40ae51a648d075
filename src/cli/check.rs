//! `tend check`: audit the whole system.

use jiff::Timestamp;

use tend::integrity;
use tend::model::Snapshot;

use super::format::format_violation;

/// Print the report. Hard violations make the command fail.
pub(super) fn cmd_check(snapshot: &Snapshot, json: bool, now: Timestamp) -> Result<(), String> {
    let report = integrity::check(snapshot, now);
    tracing::info!(
        hard = report.hard.len(),
        soft = report.soft.len(),
        "integrity check"
    );

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("failed to serialize report: {e}"))?;
        println!("{out}");
    } else if report.clean {
        println!("Clean");
    } else {
        for violation in &report.violations {
            println!("{}", format_violation(violation));
        }
        println!(
            "\n{} hard, {} soft",
            report.hard.len(),
            report.soft.len()
        );
    }

    if report.hard.is_empty() {
        Ok(())
    } else {
        Err(format!("{} hard violation(s)", report.hard.len()))
    }
}
