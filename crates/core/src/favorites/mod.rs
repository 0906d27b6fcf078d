//! Durable favorites.
//!
//! [`FavoritesStore`] keeps the favorite set in memory and writes the whole
//! set through to a [`FavoritesStorage`] slot on every mutation. The new
//! in-memory state only becomes visible after the durable write succeeded;
//! if the write fails the previous state is kept and the caller gets
//! [`FavoritesError::Persistence`].

mod set;
mod sqlite;
mod storage;

pub use set::FavoriteSet;
pub use sqlite::SqliteStorage;
pub use storage::{FavoritesStorage, StorageError, UnavailableStorage};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::book::Book;
use crate::metrics;

/// Default slot the favorites are stored under.
pub const DEFAULT_FAVORITES_KEY: &str = "favoriteBooks";

#[derive(Debug, Error)]
pub enum FavoritesError {
    /// The durable write failed; in-memory state was left unchanged.
    #[error("Failed to persist favorites: {0}")]
    Persistence(#[from] StorageError),
}

/// What the store found in durable storage when it was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesStartup {
    /// A valid slot was decoded.
    Restored { count: usize },
    /// Nothing was stored yet.
    Absent,
    /// The slot could not be read or decoded and was treated as empty.
    Corrupt { reason: String },
}

/// Write-through favorites store.
///
/// Every mutation holds the store lock for its whole read-modify-persist
/// cycle, so concurrent callers are applied one after another.
pub struct FavoritesStore {
    storage: Arc<dyn FavoritesStorage>,
    key: String,
    set: Mutex<FavoriteSet>,
    changes: watch::Sender<Vec<Book>>,
    startup: FavoritesStartup,
}

impl FavoritesStore {
    /// Open the store under the default slot key.
    pub fn open(storage: Arc<dyn FavoritesStorage>) -> Self {
        Self::open_with_key(storage, DEFAULT_FAVORITES_KEY)
    }

    /// Open the store, restoring whatever the slot holds.
    ///
    /// Never fails: unreadable or corrupt data is logged and replaced by an
    /// empty set.
    pub fn open_with_key(storage: Arc<dyn FavoritesStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (set, startup) = Self::restore(storage.as_ref(), &key);
        let (changes, _) = watch::channel(set.to_vec());

        Self {
            storage,
            key,
            set: Mutex::new(set),
            changes,
            startup,
        }
    }

    fn restore(storage: &dyn FavoritesStorage, key: &str) -> (FavoriteSet, FavoritesStartup) {
        let raw = match storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "No stored favorites, starting empty");
                return (FavoriteSet::new(), FavoritesStartup::Absent);
            }
            Err(e) => {
                warn!(key, "Could not read stored favorites, starting empty: {}", e);
                return (
                    FavoriteSet::new(),
                    FavoritesStartup::Corrupt {
                        reason: e.to_string(),
                    },
                );
            }
        };

        match FavoriteSet::from_json(&raw) {
            Ok(set) => {
                info!(key, count = set.len(), "Restored favorites");
                let count = set.len();
                (set, FavoritesStartup::Restored { count })
            }
            Err(e) => {
                warn!(key, "Stored favorites are corrupt, starting empty: {}", e);
                (
                    FavoriteSet::new(),
                    FavoritesStartup::Corrupt {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, FavoriteSet> {
        self.set.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist `next` and make it the current set.
    ///
    /// On failure `current` is untouched.
    fn commit(
        &self,
        current: &mut FavoriteSet,
        next: FavoriteSet,
        op: &'static str,
    ) -> Result<(), FavoritesError> {
        let written = next
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))
            .and_then(|json| self.storage.set(&self.key, &json));

        if let Err(e) = written {
            metrics::FAVORITES_MUTATIONS
                .with_label_values(&[op, "failed"])
                .inc();
            error!(op, key = %self.key, "Failed to persist favorites: {}", e);
            return Err(FavoritesError::Persistence(e));
        }

        *current = next;
        self.changes.send_replace(current.to_vec());
        metrics::FAVORITES_MUTATIONS
            .with_label_values(&[op, "success"])
            .inc();
        Ok(())
    }

    /// Insert or overwrite the favorite for `book.id` (last write wins).
    pub fn add(&self, book: Book) -> Result<(), FavoritesError> {
        let mut current = self.lock();
        let id = book.id.clone();

        let mut next = current.clone();
        let inserted = next.insert(book);
        self.commit(&mut current, next, "add")?;

        info!(id = %id, inserted, "Favorite added");
        Ok(())
    }

    /// Remove the favorite for `id`.
    ///
    /// Returns whether an entry was removed. Removing an absent id is a no-op
    /// and does not touch storage.
    pub fn remove(&self, id: &str) -> Result<bool, FavoritesError> {
        let mut current = self.lock();
        if !current.contains(id) {
            debug!(id, "Remove of non-favorite ignored");
            return Ok(false);
        }

        let mut next = current.clone();
        next.remove(id);
        self.commit(&mut current, next, "remove")?;

        info!(id, "Favorite removed");
        Ok(true)
    }

    /// Flip membership for `book`: remove it if favorited, add it otherwise.
    ///
    /// Returns whether the book is a favorite afterwards.
    pub fn toggle(&self, book: Book) -> Result<bool, FavoritesError> {
        let mut current = self.lock();
        let mut next = current.clone();

        if next.remove(&book.id).is_some() {
            self.commit(&mut current, next, "remove")?;
            info!(id = %book.id, "Favorite toggled off");
            Ok(false)
        } else {
            let id = book.id.clone();
            next.insert(book);
            self.commit(&mut current, next, "add")?;
            info!(id = %id, "Favorite toggled on");
            Ok(true)
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    /// The stored copy for `id`.
    pub fn get(&self, id: &str) -> Option<Book> {
        self.lock().get(id).cloned()
    }

    /// Favorites in insertion order.
    pub fn list(&self) -> Vec<Book> {
        self.lock().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// What was found in storage when the store was opened.
    pub fn startup(&self) -> &FavoritesStartup {
        &self.startup
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Subscribe to the favorites list; notified after each successful
    /// mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Book>> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MemoryStorage};

    fn store_with(storage: &MemoryStorage) -> FavoritesStore {
        FavoritesStore::open(Arc::new(storage.clone()))
    }

    #[test]
    fn test_add_then_contains_then_remove() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        let book = fixtures::book("1", "The Hobbit", &["J.R.R. Tolkien"]);

        store.add(book).unwrap();
        assert!(store.contains("1"));

        assert!(store.remove("1").unwrap());
        assert!(!store.contains("1"));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.add(fixtures::book("1", "A", &["X"])).unwrap();
        let before = store.list();
        let writes = storage.write_count();

        assert!(!store.remove("missing").unwrap());
        assert_eq!(store.list(), before);
        assert_eq!(storage.write_count(), writes);
    }

    #[test]
    fn test_add_is_idempotent() {
        let storage = MemoryStorage::new();
        let once = store_with(&storage);
        let book = fixtures::book("1", "A", &["X"]);
        once.add(book.clone()).unwrap();

        let twice = store_with(&MemoryStorage::new());
        twice.add(book.clone()).unwrap();
        twice.add(book).unwrap();

        assert_eq!(once.list(), twice.list());
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_readd_overwrites_with_latest_value() {
        let store = store_with(&MemoryStorage::new());
        store.add(fixtures::book("1", "Stale", &["X"])).unwrap();
        store.add(fixtures::book("2", "Other", &["Y"])).unwrap();
        store.add(fixtures::book("1", "Fresh", &["X"])).unwrap();

        let list = store.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "1");
        assert_eq!(list[0].title, "Fresh");
    }

    #[test]
    fn test_list_in_insertion_order() {
        let store = store_with(&MemoryStorage::new());
        for id in ["c", "a", "b"] {
            store.add(fixtures::book(id, id, &["X"])).unwrap();
        }
        let ids: Vec<String> = store.list().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_every_mutation_writes_through() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);

        store.add(fixtures::book("1", "A", &["X"])).unwrap();
        let raw = storage.raw(DEFAULT_FAVORITES_KEY).unwrap();
        assert_eq!(FavoriteSet::from_json(&raw).unwrap().len(), 1);

        store.remove("1").unwrap();
        let raw = storage.raw(DEFAULT_FAVORITES_KEY).unwrap();
        assert!(FavoriteSet::from_json(&raw).unwrap().is_empty());
        assert_eq!(storage.write_count(), 2);
    }

    #[test]
    fn test_reopen_restores_favorites() {
        let storage = MemoryStorage::new();
        {
            let store = store_with(&storage);
            store.add(fixtures::book("1", "A", &["X"])).unwrap();
            store.add(fixtures::book("2", "B", &["Y"])).unwrap();
        }

        let store = store_with(&storage);
        assert_eq!(store.startup(), &FavoritesStartup::Restored { count: 2 });
        assert_eq!(store.list().len(), 2);
        assert!(store.contains("2"));
    }

    #[test]
    fn test_add_with_failing_storage_rolls_back() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        storage.set_fail_writes(true);

        let err = store
            .add(fixtures::book("1", "A", &["X"]))
            .unwrap_err();
        assert!(matches!(err, FavoritesError::Persistence(_)));
        assert!(!store.contains("1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_with_failing_storage_keeps_entry() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.add(fixtures::book("1", "A", &["X"])).unwrap();
        storage.set_fail_writes(true);

        assert!(store.remove("1").is_err());
        assert!(store.contains("1"));

        // Durable copy still holds the entry too
        let raw = storage.raw(DEFAULT_FAVORITES_KEY).unwrap();
        assert!(FavoriteSet::from_json(&raw).unwrap().contains("1"));
    }

    #[test]
    fn test_overwrite_with_failing_storage_keeps_old_value() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.add(fixtures::book("1", "Original", &["X"])).unwrap();
        storage.set_fail_writes(true);

        assert!(store.add(fixtures::book("1", "Changed", &["X"])).is_err());
        assert_eq!(store.get("1").unwrap().title, "Original");
    }

    #[test]
    fn test_corrupt_slot_starts_empty_and_recovers() {
        let storage = MemoryStorage::new();
        storage.put_raw(DEFAULT_FAVORITES_KEY, "{not valid json");

        let store = store_with(&storage);
        assert!(store.is_empty());
        assert!(matches!(store.startup(), FavoritesStartup::Corrupt { .. }));

        // Still usable, and the next write replaces the corrupt slot
        store.add(fixtures::book("1", "A", &["X"])).unwrap();
        let raw = storage.raw(DEFAULT_FAVORITES_KEY).unwrap();
        assert!(FavoriteSet::from_json(&raw).is_ok());
    }

    #[test]
    fn test_unreadable_storage_starts_empty() {
        let storage = MemoryStorage::new();
        storage.set_fail_reads(true);

        let store = store_with(&storage);
        assert!(store.is_empty());
        assert!(matches!(store.startup(), FavoritesStartup::Corrupt { .. }));
    }

    #[test]
    fn test_absent_slot() {
        let store = store_with(&MemoryStorage::new());
        assert_eq!(store.startup(), &FavoritesStartup::Absent);
    }

    #[test]
    fn test_custom_key() {
        let storage = MemoryStorage::new();
        let store = FavoritesStore::open_with_key(Arc::new(storage.clone()), "shelf");
        store.add(fixtures::book("1", "A", &["X"])).unwrap();

        assert!(storage.raw("shelf").is_some());
        assert!(storage.raw(DEFAULT_FAVORITES_KEY).is_none());
        assert_eq!(store.key(), "shelf");
    }

    #[test]
    fn test_toggle() {
        let store = store_with(&MemoryStorage::new());
        let book = fixtures::book("1", "A", &["X"]);

        assert!(store.toggle(book.clone()).unwrap());
        assert!(store.contains("1"));
        assert!(!store.toggle(book).unwrap());
        assert!(!store.contains("1"));
    }

    #[test]
    fn test_toggle_failure_keeps_state() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        storage.set_fail_writes(true);

        assert!(store.toggle(fixtures::book("1", "A", &["X"])).is_err());
        assert!(!store.contains("1"));
    }

    #[test]
    fn test_favorites_survive_without_catalog() {
        // Stored copies are independent of any snapshot
        let store = store_with(&MemoryStorage::new());
        let mut book = fixtures::book("1", "A", &["X"]);
        store.add(book.clone()).unwrap();

        book.title = "Mutated after add".to_string();
        assert_eq!(store.get("1").unwrap().title, "A");
    }

    #[test]
    fn test_subscribe_notified_on_success_only() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        let mut rx = store.subscribe();

        store.add(fixtures::book("1", "A", &["X"])).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        storage.set_fail_writes(true);
        let _ = store.add(fixtures::book("2", "B", &["Y"]));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let storage = MemoryStorage::new();
        let store = Arc::new(store_with(&storage));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .add(fixtures::book(&format!("{}", i), "T", &["A"]))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 16);
        let raw = storage.raw(DEFAULT_FAVORITES_KEY).unwrap();
        assert_eq!(FavoriteSet::from_json(&raw).unwrap().len(), 16);
    }
}
