use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{FavoritesStorage, StorageError};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_slots (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
"#;

/// SQLite-backed slot storage
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) the database file and its table
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::Database(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Create an in-memory SQLite storage (useful for testing)
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Database(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("connection lock poisoned".to_string()))
    }
}

impl FavoritesStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT value FROM kv_slots WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StorageError::Database(e.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_missing_key() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert_eq!(storage.get("favoriteBooks").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.set("favoriteBooks", "[]").unwrap();
        assert_eq!(storage.get("favoriteBooks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_set_overwrites_whole_slot() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.set("k", "first").unwrap();
        storage.set("k", "second").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_slots_are_independent() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shelf.db");

        {
            let storage = SqliteStorage::new(&path).unwrap();
            storage.set("favoriteBooks", r#"[{"id":"1"}]"#).unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        assert_eq!(
            storage.get("favoriteBooks").unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }

    #[test]
    fn test_open_invalid_path_fails() {
        let result = SqliteStorage::new(Path::new("/nonexistent/dir/shelf.db"));
        assert!(matches!(result, Err(StorageError::Database(_))));
    }
}
