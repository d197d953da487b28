use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::storage::PayloadStore;

#[derive(Debug, Default)]
struct Inner {
    payloads: HashMap<String, Vec<u8>>,
    writes: usize,
}

/// In-memory payload store.
///
/// Useful for local runs and tests; also serves as the reference implementation of the
/// [`PayloadStore`] contract.
#[derive(Debug, Clone, Default)]
pub struct MemoryPayloadStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryPayloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the payload stored under `key`, if any.
    pub async fn payload(&self, key: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().await;
        inner.payloads.get(key).cloned()
    }

    /// Returns the number of writes performed, including overwrites.
    pub async fn writes(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.writes
    }
}

impl PayloadStore for MemoryPayloadStore {
    async fn put(&self, key: &str, payload: &[u8]) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        inner.payloads.insert(key.to_string(), payload.to_vec());
        inner.writes += 1;

        Ok(())
    }
}
