//! Durable home of the waypoint list.
//!
//! The core only ever reads or replaces one slot as a whole, so a store is a
//! minimal key-value substrate. Shells on mobile answer `Storage` effects
//! themselves; the native host answers them with a [`WaypointStore`].

mod codec;
mod memory;
#[cfg(not(target_arch = "wasm32"))]
mod sqlite;

pub use self::codec::{decode_waypoints, encode_waypoints};
pub use self::memory::MemoryStore;
#[cfg(not(target_arch = "wasm32"))]
pub use self::sqlite::SqliteStore;

use crate::capabilities::{StorageKey, StorageOperation, StorageOutput, StorageResult};
use crate::error::StoreError;

#[async_trait::async_trait]
pub trait WaypointStore: Send + Sync {
    /// `None` when the slot has never been written.
    async fn read(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Atomically supersedes any prior content of the slot.
    async fn replace(&self, key: &StorageKey, value: &[u8]) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<T> WaypointStore for std::sync::Arc<T>
where
    T: WaypointStore + ?Sized,
{
    async fn read(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).read(key).await
    }

    async fn replace(&self, key: &StorageKey, value: &[u8]) -> Result<(), StoreError> {
        (**self).replace(key, value).await
    }
}

/// Answers a `Storage` effect against `store`.
pub async fn execute<S>(store: &S, operation: &StorageOperation) -> StorageResult
where
    S: WaypointStore + ?Sized,
{
    match operation {
        StorageOperation::Get { key } => Ok(match store.read(key).await? {
            Some(bytes) => StorageOutput::Value(bytes),
            None => StorageOutput::Missing,
        }),
        StorageOperation::Replace { key, value } => {
            store.replace(key, value).await?;
            Ok(StorageOutput::Written)
        }
    }
}
