use std::path::{Path, PathBuf};

use orchestrator::error::StorageError;
use orchestrator::storage::PayloadStore;

/// Payload store backed by a local directory.
///
/// Storage keys map directly onto file paths under the root directory, so an offloaded
/// output for attempt 3 of job 42 lands under
/// `<root>/v1/<connection_id>/42/3/replication-output`.
#[derive(Debug, Clone)]
pub struct FsPayloadStore {
    root: PathBuf,
}

impl FsPayloadStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl PayloadStore for FsPayloadStore {
    async fn put(&self, key: &str, payload: &[u8]) -> Result<(), StorageError> {
        let path = self.root.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, payload).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_payloads_under_the_root_directory() {
        let root = std::env::temp_dir().join(format!("runner-store-test-{}", uuid::Uuid::new_v4()));
        let store = FsPayloadStore::new(&root);

        store
            .put("v1/conn/42/3/replication-output", b"{\"state\":null}")
            .await
            .unwrap();

        let written = std::fs::read(root.join("v1/conn/42/3/replication-output")).unwrap();
        assert_eq!(written, b"{\"state\":null}");

        std::fs::remove_dir_all(&root).unwrap();
    }
}
