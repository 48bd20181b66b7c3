//! Durable named-slot storage medium.
//!
//! # Responsibility
//! - Define the key-value slot contract the persistence store writes through.
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - A slot value is replaced wholesale by one `set_item` call; readers never
//!   observe a partially written value.
//! - `revision` changes on every write or removal of a slot and never repeats
//!   for the same medium.
//! - Keys must match `SLOT_KEY_PATTERN`.

use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory_slots;
mod sqlite_slots;

pub use memory_slots::MemorySlotStorage;
pub use sqlite_slots::SqliteSlotStorage;

/// Accepted slot key shape.
pub const SLOT_KEY_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_.\-]{0,63}$";

static SLOT_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(SLOT_KEY_PATTERN).expect("valid slot key regex"));

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by the slot medium.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    InvalidKey(String),
    /// The write would push the medium past its capacity.
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl StorageError {
    /// Whether the medium was locked by another context; see `DbError::is_busy`.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_busy())
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid slot key `{key}`"),
            Self::QuotaExceeded { key, needed, quota } => write!(
                f,
                "storage quota exceeded writing `{key}`: needs {needed} bytes, quota is {quota}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Named-slot key-value medium.
///
/// Mirrors a browser-style local storage area: every slot holds one string
/// and is read and replaced as a unit.
pub trait SlotStorage {
    /// Returns the slot value, or `None` when the slot was never written.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the slot value. On error the previous value is kept.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Removes the slot. Removing a missing slot is a no-op.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
    /// Returns the current revision of the slot, or `None` when absent.
    fn revision(&self, key: &str) -> StorageResult<Option<u64>>;
}

/// Validates a slot key against `SLOT_KEY_PATTERN`.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if SLOT_KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
