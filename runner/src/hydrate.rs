use std::path::{Path, PathBuf};

use orchestrator::error::HydrationError;
use orchestrator::hydration::SpecHydrator;
use orchestrator::types::{AttemptRequest, ReplicationSpec};
use tracing::info;

/// Hydrator that reads a pre-hydrated replication spec from disk.
///
/// The runner stands in for the external hydration service when executing attempts
/// locally: catalog, cursor state and connector secrets all come from a spec file
/// prepared by the operator.
#[derive(Debug, Clone)]
pub struct FileSpecHydrator {
    path: PathBuf,
}

impl FileSpecHydrator {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SpecHydrator for FileSpecHydrator {
    async fn hydrate(&self, request: &AttemptRequest) -> Result<ReplicationSpec, HydrationError> {
        // Only the path is logged, never the spec contents: they carry secrets.
        info!(
            connection_id = %request.connection_id,
            path = %self.path.display(),
            "reading replication spec"
        );

        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            HydrationError::DependencyUnavailable(format!(
                "failed to read the replication spec at {}: {err}",
                self.path.display()
            ))
        })?;

        let spec = serde_json::from_slice(&bytes)?;

        Ok(spec)
    }
}
