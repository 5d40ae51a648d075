//! Read-only calendar feed.
//!
//! Events are only ever used to suggest how many minutes are free right
//! now; the ranking engine never sees them.

use std::{fs, io, path::Path};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("failed to read calendar feed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid calendar feed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: Timestamp,
    pub end: Timestamp,
    #[serde(default)]
    pub all_day: bool,
}

/// Load events from a JSON file holding an array of events.
pub fn load_events(path: &Path) -> Result<Vec<CalendarEvent>, CalendarError> {
    let json = fs::read_to_string(path)?;
    let events: Vec<CalendarEvent> = serde_json::from_str(&json)?;
    tracing::debug!(count = events.len(), path = %path.display(), "loaded calendar events");
    Ok(events)
}

/// Whole minutes free from `now` until the next timed commitment.
///
/// An event already in progress leaves nothing free. Otherwise the gap
/// runs to the earliest upcoming timed event, or to `horizon` if there is
/// none before it. All-day events never constrain the gap.
pub fn suggest_available_minutes(
    events: &[CalendarEvent],
    now: Timestamp,
    horizon: Timestamp,
) -> u32 {
    let timed = events.iter().filter(|e| !e.all_day);

    if timed.clone().any(|e| e.start <= now && now < e.end) {
        return 0;
    }

    let until = timed
        .map(|e| e.start)
        .filter(|&start| start > now)
        .min()
        .map_or(horizon, |start| start.min(horizon));

    let minutes = (until.as_second() - now.as_second()).max(0) / 60;
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_second(secs).unwrap()
    }

    fn event(start_min: i64, end_min: i64, all_day: bool) -> CalendarEvent {
        CalendarEvent {
            id: format!("e{start_min}"),
            title: "Meeting".into(),
            start: at(start_min * 60),
            end: at(end_min * 60),
            all_day,
        }
    }

    #[test]
    fn free_until_horizon_without_events() {
        assert_eq!(suggest_available_minutes(&[], at(0), at(90 * 60)), 90);
    }

    #[test]
    fn free_until_next_event() {
        let events = vec![event(120, 180, false), event(45, 60, false)];
        assert_eq!(suggest_available_minutes(&events, at(0), at(600 * 60)), 45);
    }

    #[test]
    fn busy_during_event() {
        let events = vec![event(-10, 20, false)];
        assert_eq!(suggest_available_minutes(&events, at(0), at(600 * 60)), 0);
    }

    #[test]
    fn all_day_and_past_events_ignored() {
        let events = vec![event(-600, 600, true), event(-60, -30, false)];
        assert_eq!(suggest_available_minutes(&events, at(0), at(100 * 60)), 100);
    }

    #[test]
    fn event_after_horizon_ignored() {
        let events = vec![event(500, 560, false)];
        assert_eq!(suggest_available_minutes(&events, at(0), at(100 * 60)), 100);
    }

    #[test]
    fn horizon_in_past_gives_zero() {
        assert_eq!(suggest_available_minutes(&[], at(600), at(0)), 0);
    }

    #[test]
    fn load_events_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.json");
        fs::write(
            &path,
            r#"[{"id":"1","title":"Standup","start":"2026-01-05T09:00:00Z","end":"2026-01-05T09:15:00Z"}]"#,
        )
        .unwrap();

        let events = load_events(&path).unwrap();
        assert_eq!(events.len(), 1);
        assert!(!events[0].all_day);
        assert_eq!(events[0].start, "2026-01-05T09:00:00Z".parse::<Timestamp>().unwrap());
    }

    #[test]
    fn load_events_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_events(&path), Err(CalendarError::Json(_))));
    }
}
