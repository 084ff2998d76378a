use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, instrument};

use super::WaypointStore;
use crate::capabilities::StorageKey;
use crate::error::StoreError;
use crate::model::UnixTimeMs;

/// SQLite-backed key-value table with transactional replace.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value BLOB NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait::async_trait]
impl WaypointStore for SqliteStore {
    #[instrument(skip_all, fields(key = key.as_str()))]
    async fn read(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockFailed)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key.as_str()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        debug!(found = value.is_some(), "read slot");
        Ok(value)
    }

    #[instrument(skip_all, fields(key = key.as_str(), len = value.len()))]
    async fn replace(&self, key: &StorageKey, value: &[u8]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockFailed)?;
        let tx = conn.transaction()?;
        #[allow(clippy::cast_possible_wrap)]
        let updated_at = UnixTimeMs::now().as_millis() as i64;
        tx.execute(
            r"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![key.as_str(), value, updated_at],
        )?;
        tx.commit()?;
        debug!("replaced slot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> StorageKey {
        StorageKey::parse("waypoints_json").unwrap()
    }

    #[tokio::test]
    async fn missing_slot_reads_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.read(&key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn replace_supersedes_prior_value() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace(&key(), b"[1]").await.unwrap();
        store.replace(&key(), b"[]").await.unwrap();
        assert_eq!(store.read(&key()).await.unwrap(), Some(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn slots_are_independent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let other = StorageKey::parse("other").unwrap();
        store.replace(&key(), b"a").await.unwrap();
        store.replace(&other, b"b").await.unwrap();
        assert_eq!(store.read(&key()).await.unwrap(), Some(b"a".to_vec()));
        assert_eq!(store.read(&other).await.unwrap(), Some(b"b".to_vec()));
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waypoints.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.replace(&key(), b"[]").await.unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.read(&key()).await.unwrap(), Some(b"[]".to_vec()));
    }
}
