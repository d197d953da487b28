use std::future::Future;

use crate::error::StorageError;

mod memory;

pub use memory::MemoryPayloadStore;

/// Collaborator that persists oversized sync outputs.
///
/// Only the write contract of the external object storage is consumed: the orchestrator
/// never reads payloads back, consumers of the stored artifact do. Writes may block for
/// a while; a failure must never fail the attempt that triggered it.
pub trait PayloadStore {
    fn put(
        &self,
        key: &str,
        payload: &[u8],
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}
