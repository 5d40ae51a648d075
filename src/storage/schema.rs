//! Table layout and schema versioning.

use rusqlite::{Connection, OptionalExtension};

use super::{Result, Storage, StorageError};

pub const SCHEMA_VERSION: i64 = 1;

/// Collection tables, all with the same shape.
pub(super) const COLLECTION_TABLES: [&str; 5] = [
    "inbox_items",
    "next_actions",
    "projects",
    "waiting_for",
    "weekly_reviews",
];

pub(super) fn initialize(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "busy_timeout", 5000)?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    for table in COLLECTION_TABLES {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id       TEXT PRIMARY KEY,
                position INTEGER NOT NULL,
                record   TEXT NOT NULL
            );"
        ))?;
    }

    let stored = read_version(conn)?;
    match stored {
        None => {
            conn.execute(
                "INSERT INTO metadata (key, value) VALUES ('schema_version', ?1)",
                [SCHEMA_VERSION.to_string()],
            )?;
            tracing::info!(version = SCHEMA_VERSION, "initialized storage schema");
        }
        Some(v) if v > SCHEMA_VERSION => {
            return Err(StorageError::Corrupt(format!(
                "database schema version {v} is newer than supported version {SCHEMA_VERSION}"
            )));
        }
        Some(_) => {}
    }

    Ok(())
}

fn read_version(conn: &Connection) -> Result<Option<i64>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    value
        .map(|v| {
            v.parse::<i64>()
                .map_err(|e| StorageError::Corrupt(format!("invalid schema version '{v}': {e}")))
        })
        .transpose()
}

impl Storage {
    /// The schema version recorded in the database.
    pub fn schema_version(&self) -> Result<i64> {
        read_version(&self.conn)?
            .ok_or_else(|| StorageError::Corrupt("schema version missing".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        initialize(&conn).unwrap();
        assert_eq!(read_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn.execute(
            "UPDATE metadata SET value = '99' WHERE key = 'schema_version'",
            [],
        )
        .unwrap();

        let err = initialize(&conn).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
