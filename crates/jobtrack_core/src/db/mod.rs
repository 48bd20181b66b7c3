//! SQLite bootstrap for the durable slot medium.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing `SqliteSlotStorage`.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Slot storage refuses connections whose migrations have not run.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures of the SQLite slot medium.
#[derive(Debug)]
pub enum DbError {
    /// Driver-level failure: open, lock contention, I/O or SQL error.
    Sqlite(rusqlite::Error),
    /// The file was migrated by a newer build; its slots are left untouched.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A slot row carries a revision no write could have produced.
    CorruptRevision { key: String, value: i64 },
}

impl DbError {
    /// Whether another connection held the database lock past the busy timeout.
    ///
    /// Callers may retry the same operation later; nothing was written.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if matches!(
                    err.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "slot database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::CorruptRevision { key, value } => {
                write!(f, "slot `{key}` has invalid revision {value}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::CorruptRevision { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
