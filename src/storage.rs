//! Local persistence for the five entity collections.
//!
//! Everything lives in one `SQLite` file:
//!
//! ```text
//! <data-dir>/tend.sqlite
//!   metadata         # schema version
//!   inbox_items      # one table per collection:
//!   next_actions     #   (id, position, record)
//!   projects         # `record` is the entity's JSON,
//!   waiting_for      # `position` keeps collection order
//!   weekly_reviews
//! ```
//!
//! The rule core never patches records. Callers compute a new collection
//! and hand the whole thing back; each save replaces one table in a single
//! transaction.

mod collections;
mod schema;

use std::{fs, io, path::Path, path::PathBuf};

use rusqlite::Connection;

pub use collections::Record;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// `SQLite`-backed storage for a single user's system.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the database at `path`.
    ///
    /// Parent directories are created if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        tracing::debug!(path = %path.display(), "opened storage");
        Ok(Self { conn })
    }

    /// A throwaway database, for tests and dry runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Returns the default data directory: `~/.tend/`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".tend"))
    }

    /// The database file inside a data directory.
    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join("tend.sqlite")
    }
}
