//! In-memory slot storage for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::favorites::{FavoritesStorage, StorageError};

/// In-memory implementation of the FavoritesStorage trait.
///
/// Clones share the same slots, so a test can keep a handle to inspect
/// what the store wrote. Reads and writes can be made to fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every write fail with [`StorageError::QuotaExceeded`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every read fail with [`StorageError::Unavailable`].
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Write a slot directly, bypassing failure injection.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.slots().insert(key.to_string(), value.to_string());
    }

    /// Read a slot directly.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots().get(key).cloned()
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl FavoritesStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::QuotaExceeded);
        }
        self.put_raw(key, value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
