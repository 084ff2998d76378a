use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::RwLock;

use super::WaypointStore;
use crate::capabilities::StorageKey;
use crate::error::StoreError;

/// Volatile store for tests and previews. Writes can be made to fail on
/// demand.
#[derive(Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a slot, e.g. with data written by an older app version.
    #[must_use]
    pub fn with_slot(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.to_string(), value.into());
        Self {
            slots: RwLock::new(slots),
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self, key: &str) -> Option<Vec<u8>> {
        self.slots.read().await.get(key).cloned()
    }
}

#[async_trait::async_trait]
impl WaypointStore for MemoryStore {
    async fn read(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.slots.read().await.get(key.as_str()).cloned())
    }

    async fn replace(&self, key: &StorageKey, value: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend {
                message: "injected write failure".into(),
            });
        }
        self.slots
            .write()
            .await
            .insert(key.as_str().to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
