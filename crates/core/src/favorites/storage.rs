//! Durable key/value capability the favorites store writes through to.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A store of named string slots.
///
/// Writes overwrite the whole slot. There is no isolation from other
/// writers of the same key: the last write wins.
pub trait FavoritesStorage: Send + Sync {
    /// Read a slot. `Ok(None)` when nothing was ever written to it.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a slot.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Stand-in for a backend that could not be opened.
///
/// Every read and write fails with [`StorageError::Unavailable`], so the
/// favorites store starts empty and rejects mutations while the rest of the
/// session keeps working.
#[derive(Debug, Clone)]
pub struct UnavailableStorage {
    reason: String,
}

impl UnavailableStorage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl FavoritesStorage for UnavailableStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }
}
