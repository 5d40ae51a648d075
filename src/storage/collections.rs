//! Whole-collection load and replace.

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::model::{InboxItem, NextAction, Project, Snapshot, WaitingFor, WeeklyReview};

use super::{Result, Storage, StorageError};

/// An entity that is persisted as one row of a collection table.
pub trait Record: Serialize + DeserializeOwned {
    /// Table holding this collection.
    const TABLE: &'static str;

    fn id(&self) -> Uuid;
}

macro_rules! record {
    ($ty:ty, $table:literal) => {
        impl Record for $ty {
            const TABLE: &'static str = $table;

            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
}

record!(InboxItem, "inbox_items");
record!(NextAction, "next_actions");
record!(Project, "projects");
record!(WaitingFor, "waiting_for");
record!(WeeklyReview, "weekly_reviews");

impl Storage {
    /// Loads every collection in stored order.
    pub fn load(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            inbox_items: self.load_collection()?,
            next_actions: self.load_collection()?,
            projects: self.load_collection()?,
            waiting_for: self.load_collection()?,
            weekly_reviews: self.load_collection()?,
        })
    }

    pub fn save_inbox_items(&self, items: &[InboxItem]) -> Result<()> {
        self.replace_collection(items)
    }

    pub fn save_next_actions(&self, actions: &[NextAction]) -> Result<()> {
        self.replace_collection(actions)
    }

    pub fn save_projects(&self, projects: &[Project]) -> Result<()> {
        self.replace_collection(projects)
    }

    pub fn save_waiting_for(&self, items: &[WaitingFor]) -> Result<()> {
        self.replace_collection(items)
    }

    pub fn save_weekly_reviews(&self, reviews: &[WeeklyReview]) -> Result<()> {
        self.replace_collection(reviews)
    }

    /// Loads one collection, ordered by stored position.
    pub fn load_collection<T: Record>(&self) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, record FROM {} ORDER BY position",
            T::TABLE
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, json) = row?;
            let record: T = serde_json::from_str(&json)?;
            if record.id().to_string() != id {
                return Err(StorageError::Corrupt(format!(
                    "{} row {id} holds record {}",
                    T::TABLE,
                    record.id()
                )));
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Replaces a whole collection, keeping slice order.
    ///
    /// Runs in one transaction: on error the previous contents remain.
    pub fn replace_collection<T: Record>(&self, records: &[T]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(&format!("DELETE FROM {}", T::TABLE), [])?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (id, position, record) VALUES (?1, ?2, ?3)",
                T::TABLE
            ))?;
            for (position, record) in records.iter().enumerate() {
                let json = serde_json::to_string(record)?;
                let position = i64::try_from(position)
                    .map_err(|e| StorageError::Corrupt(format!("collection too large: {e}")))?;
                stmt.execute(rusqlite::params![record.id().to_string(), position, json])?;
            }
        }
        tx.commit()?;
        tracing::debug!(table = T::TABLE, count = records.len(), "saved collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use tempfile::TempDir;

    use crate::model::{
        Context, Disposition, Energy, NewNextAction, NewProject, NewWaitingFor, ReviewStep,
    };

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_second(secs).unwrap()
    }

    fn sample_action(title: &str) -> NextAction {
        NextAction::new(
            NewNextAction {
                title: title.into(),
                context: Context::Calls,
                energy: Energy::High,
                time_estimate: 45,
                project_id: Some(Uuid::new_v4()),
                due_date: Some("2026-04-01T12:00:00.5Z".parse().unwrap()),
                start_date: None,
                notes: Some("ask about the invoice".into()),
            },
            at(1_700_000_000),
        )
    }

    fn full_snapshot() -> Snapshot {
        let project = Project::new(
            NewProject {
                title: "Website Redesign".into(),
                outcome_statement: "New site is live.".into(),
                review_interval: Some(14),
                notes: None,
            },
            at(1_700_000_000),
        )
        .mark_reviewed(at(1_700_100_000));
        let waiting = WaitingFor::new(
            NewWaitingFor {
                title: "Logo files".into(),
                owner: "Designer".into(),
                expected_by: Some(at(1_700_500_000)),
                project_id: Some(project.id),
                followup_interval: Some(3),
                notes: None,
            },
            at(1_700_000_000),
        );
        Snapshot {
            inbox_items: vec![
                InboxItem::capture("buy stamps", at(1_700_000_000)),
                InboxItem::capture("old flyer", at(1_700_000_000))
                    .clarify(Some(Disposition::Reference), at(1_700_000_100)),
            ],
            next_actions: vec![sample_action("Call the bank").complete(at(1_700_200_000))],
            projects: vec![project],
            waiting_for: vec![waiting],
            weekly_reviews: vec![
                WeeklyReview::start(at(1_700_000_000))
                    .complete_step(ReviewStep::CheckWaitingFor)
                    .finish(at(1_700_003_600)),
            ],
        }
    }

    #[test]
    fn empty_database_loads_empty_snapshot() {
        let storage = Storage::in_memory().unwrap();
        assert_eq!(storage.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn save_and_load_every_collection() {
        let storage = Storage::in_memory().unwrap();
        let snapshot = full_snapshot();

        storage.save_inbox_items(&snapshot.inbox_items).unwrap();
        storage.save_next_actions(&snapshot.next_actions).unwrap();
        storage.save_projects(&snapshot.projects).unwrap();
        storage.save_waiting_for(&snapshot.waiting_for).unwrap();
        storage.save_weekly_reviews(&snapshot.weekly_reviews).unwrap();

        assert_eq!(storage.load().unwrap(), snapshot);
    }

    #[test]
    fn replace_keeps_slice_order() {
        let storage = Storage::in_memory().unwrap();
        let actions = vec![sample_action("c"), sample_action("a"), sample_action("b")];
        storage.save_next_actions(&actions).unwrap();

        let loaded: Vec<NextAction> = storage.load_collection().unwrap();
        let titles: Vec<&str> = loaded.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[test]
    fn replace_drops_removed_records() {
        let storage = Storage::in_memory().unwrap();
        let actions = vec![sample_action("keep"), sample_action("drop")];
        storage.save_next_actions(&actions).unwrap();
        storage.save_next_actions(&actions[..1]).unwrap();

        let loaded: Vec<NextAction> = storage.load_collection().unwrap();
        assert_eq!(loaded, actions[..1].to_vec());
    }

    #[test]
    fn failed_replace_keeps_previous_contents() {
        let storage = Storage::in_memory().unwrap();
        let first = sample_action("first");
        storage.save_next_actions(&[first.clone()]).unwrap();

        // Duplicate ids violate the primary key and abort the transaction.
        let dup = sample_action("dup");
        assert!(storage.save_next_actions(&[dup.clone(), dup]).is_err());

        let loaded: Vec<NextAction> = storage.load_collection().unwrap();
        assert_eq!(loaded, vec![first]);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = Storage::db_path(dir.path());
        let snapshot = full_snapshot();

        {
            let storage = Storage::open(&path).unwrap();
            storage.save_projects(&snapshot.projects).unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.load().unwrap().projects, snapshot.projects);
    }

    #[test]
    fn timestamps_stored_as_iso8601() {
        let storage = Storage::in_memory().unwrap();
        let action = sample_action("stamp");
        storage.save_next_actions(&[action]).unwrap();

        let json: String = storage
            .conn
            .query_row("SELECT record FROM next_actions", [], |row| row.get(0))
            .unwrap();
        assert!(json.contains("\"created_at\":\"2023-11-14T22:13:20Z\""));
        assert!(json.contains("\"due_date\":\"2026-04-01T12:00:00.5Z\""));
    }

    #[test]
    fn mismatched_row_id_is_corrupt() {
        let storage = Storage::in_memory().unwrap();
        storage.save_next_actions(&[sample_action("x")]).unwrap();
        storage
            .conn
            .execute("UPDATE next_actions SET id = 'not-the-id'", [])
            .unwrap();

        let err = storage.load_collection::<NextAction>().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
