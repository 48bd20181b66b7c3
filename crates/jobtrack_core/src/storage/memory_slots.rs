//! In-memory slot storage.
//!
//! # Responsibility
//! - Provide a process-local medium for tests and ephemeral trackers.
//! - Model a capacity quota so write-failure paths can be exercised.
//!
//! # Invariants
//! - Clones share the same slots and revision counter.
//! - A rejected write leaves every slot unchanged.

use super::{validate_key, SlotStorage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    slots: HashMap<String, MemorySlot>,
    next_revision: u64,
}

#[derive(Debug)]
struct MemorySlot {
    value: String,
    revision: u64,
}

impl MemoryState {
    fn used_bytes(&self) -> usize {
        self.slots
            .iter()
            .map(|(key, slot)| key.len() + slot.value.len())
            .sum()
    }

    fn take_revision(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }
}

/// Shared in-memory slot medium with an optional byte quota.
///
/// The quota counts key and value bytes across all slots.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStorage {
    state: Arc<Mutex<MemoryState>>,
    quota: Option<usize>,
}

impl MemorySlotStorage {
    /// Creates an unbounded medium.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            state: Arc::default(),
            quota: Some(quota_bytes),
        }
    }

    /// Total key and value bytes currently stored.
    pub fn used_bytes(&self) -> usize {
        self.lock().used_bytes()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SlotStorage for MemorySlotStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        Ok(self.lock().slots.get(key).map(|slot| slot.value.clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let mut state = self.lock();

        if let Some(quota) = self.quota {
            let existing = state
                .slots
                .get(key)
                .map_or(0, |slot| key.len() + slot.value.len());
            let needed = state.used_bytes() - existing + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        let revision = state.take_revision();
        state.slots.insert(
            key.to_string(),
            MemorySlot {
                value: value.to_string(),
                revision,
            },
        );
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let mut state = self.lock();
        if state.slots.remove(key).is_some() {
            state.take_revision();
        }
        Ok(())
    }

    fn revision(&self, key: &str) -> StorageResult<Option<u64>> {
        validate_key(key)?;
        Ok(self.lock().slots.get(key).map(|slot| slot.revision))
    }
}
