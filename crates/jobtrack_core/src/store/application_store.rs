//! Application collection store over one storage slot.
//!
//! # Responsibility
//! - Serialize the full collection as a JSON array under one slot key.
//! - Turn decode failures into log events plus an empty collection.
//! - Report medium read failures to writers so they never build on a
//!   collection that was not actually read.
//!
//! # Invariants
//! - Serialization is deterministic: `save(&load())` rewrites identical bytes.
//! - No partial collection is ever written.

use crate::model::application::Application;
use crate::storage::{validate_key, SlotStorage, StorageError, StorageResult};
use log::{debug, error, warn};

/// Slot key used for the application collection unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "jobApplications";

/// Whole-collection persistence contract.
pub trait ApplicationStore {
    /// Reads the persisted collection in insertion order.
    ///
    /// Missing or malformed data reads as an empty collection.
    ///
    /// # Errors
    /// - The medium could not be read; the stored collection is unknown.
    fn try_load(&self) -> StorageResult<Vec<Application>>;
    /// Returns the persisted collection, or an empty one when it cannot be read.
    fn load(&self) -> Vec<Application> {
        self.try_load().unwrap_or_default()
    }
    /// Replaces the persisted collection. Returns `false` on failure.
    fn save(&self, applications: &[Application]) -> bool;
    /// Revision of the persisted collection, used to detect foreign writes.
    ///
    /// `None` means nothing is persisted yet or the medium cannot tell.
    fn revision(&self) -> Option<u64>;
}

/// `ApplicationStore` writing JSON into a `SlotStorage` slot.
pub struct SlotApplicationStore<S: SlotStorage> {
    storage: S,
    key: String,
}

impl<S: SlotStorage> SlotApplicationStore<S> {
    /// Creates a store using `DEFAULT_STORAGE_KEY`.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    /// Creates a store writing under a custom slot key.
    ///
    /// # Errors
    /// - `StorageError::InvalidKey` when `key` does not match the slot key shape.
    pub fn with_key(storage: S, key: impl Into<String>) -> StorageResult<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self { storage, key })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: SlotStorage> ApplicationStore for SlotApplicationStore<S> {
    fn try_load(&self) -> StorageResult<Vec<Application>> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(err) => {
                error!(
                    "event=store_load module=store status=error key={} error_code={} error={}",
                    self.key,
                    read_error_code(&err),
                    err
                );
                return Err(err);
            }
        };

        match serde_json::from_str::<Vec<Application>>(&raw) {
            Ok(applications) => {
                debug!(
                    "event=store_load module=store status=ok key={} count={}",
                    self.key,
                    applications.len()
                );
                Ok(applications)
            }
            Err(err) => {
                // Only position info is logged; serde messages may quote record text.
                warn!(
                    "event=store_load module=store status=error key={} error_code=malformed_collection bytes={} line={} column={}",
                    self.key,
                    raw.len(),
                    err.line(),
                    err.column()
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, applications: &[Application]) -> bool {
        let encoded = match serde_json::to_string(applications) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(
                    "event=store_save module=store status=error key={} error_code=serialize_failed error={}",
                    self.key, err
                );
                return false;
            }
        };

        match self.storage.set_item(&self.key, &encoded) {
            Ok(()) => {
                debug!(
                    "event=store_save module=store status=ok key={} count={} bytes={}",
                    self.key,
                    applications.len(),
                    encoded.len()
                );
                true
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error key={} error_code=storage_write_failed count={} error={}",
                    self.key,
                    applications.len(),
                    err
                );
                false
            }
        }
    }

    fn revision(&self) -> Option<u64> {
        match self.storage.revision(&self.key) {
            Ok(revision) => revision,
            Err(err) => {
                warn!(
                    "event=store_revision module=store status=error key={} error={}",
                    self.key, err
                );
                None
            }
        }
    }
}

fn read_error_code(err: &StorageError) -> &'static str {
    if err.is_busy() {
        "storage_busy"
    } else {
        "storage_read_failed"
    }
}
