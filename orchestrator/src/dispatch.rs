use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::types::{ReplicationOutput, ReplicationSpec};

/// Deterministic identifier of a remotely dispatched replication workload.
///
/// Derived purely from the attempt coordinates so a resubmission of the same attempt
/// maps onto the same workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkloadId(String);

impl WorkloadId {
    pub fn for_attempt(connection_id: Uuid, job_id: u64, attempt_number: u32) -> Self {
        Self(format!("{connection_id}_{job_id}_{attempt_number}_sync"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Execution state of a dispatched workload as reported by the dispatch api.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl WorkloadStatus {
    /// Returns whether the workload has stopped executing.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkloadStatus::Succeeded | WorkloadStatus::Failed | WorkloadStatus::Cancelled
        )
    }
}

/// Client interface of the external job-dispatch service.
///
/// Used only by the remote dispatch worker. Implementations are expected to treat
/// `submit` as idempotent for an already known workload id, since retries of an attempt
/// reuse the same deterministic id.
#[async_trait]
pub trait DispatchApi: Send + Sync {
    /// Submits a workload for execution.
    async fn submit(
        &self,
        workload_id: &WorkloadId,
        spec: &ReplicationSpec,
    ) -> Result<(), DispatchError>;

    /// Returns the current execution status of a workload.
    async fn status(&self, workload_id: &WorkloadId) -> Result<WorkloadStatus, DispatchError>;

    /// Fetches the recorded output of a workload, if any has been stored yet.
    async fn output(
        &self,
        workload_id: &WorkloadId,
    ) -> Result<Option<ReplicationOutput>, DispatchError>;

    /// Requests cancellation of a running workload.
    async fn cancel(&self, workload_id: &WorkloadId) -> Result<(), DispatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_id_is_deterministic() {
        let connection_id = Uuid::parse_str("6f2f3d3e-7a10-4e6f-9b64-2b8f5f9d8a11").unwrap();

        let id = WorkloadId::for_attempt(connection_id, 7, 2);

        assert_eq!(
            id.as_str(),
            "6f2f3d3e-7a10-4e6f-9b64-2b8f5f9d8a11_7_2_sync"
        );
        assert_eq!(id, WorkloadId::for_attempt(connection_id, 7, 2));
    }

    #[test]
    fn terminal_statuses() {
        assert!(!WorkloadStatus::Pending.is_terminal());
        assert!(!WorkloadStatus::Running.is_terminal());
        assert!(WorkloadStatus::Succeeded.is_terminal());
        assert!(WorkloadStatus::Failed.is_terminal());
        assert!(WorkloadStatus::Cancelled.is_terminal());
    }
}
