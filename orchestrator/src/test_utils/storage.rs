use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::StorageError;
use crate::storage::PayloadStore;

/// Payload store fake whose writes always fail, counting the attempts.
#[derive(Debug, Clone, Default)]
pub struct FailingPayloadStore {
    attempts: Arc<AtomicUsize>,
}

impl FailingPayloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of writes that were attempted.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl PayloadStore for FailingPayloadStore {
    async fn put(&self, _key: &str, _payload: &[u8]) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        Err(StorageError::Rejected(
            "payload store is unavailable".to_string(),
        ))
    }
}
