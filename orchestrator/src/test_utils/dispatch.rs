use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::dispatch::{DispatchApi, WorkloadId, WorkloadStatus};
use crate::error::DispatchError;
use crate::types::{ReplicationOutput, ReplicationSpec};

#[derive(Debug, Default)]
struct Inner {
    submitted: Vec<(WorkloadId, ReplicationSpec)>,
    statuses: VecDeque<WorkloadStatus>,
    output: Option<ReplicationOutput>,
    cancelled: Vec<WorkloadId>,
    polls: usize,
    fail_submit: bool,
}

/// Dispatch api fake that records every interaction.
///
/// Statuses are served in the configured order; once exhausted, the workload reports
/// [`WorkloadStatus::Running`] forever, which models a workload that never finishes.
#[derive(Debug, Default)]
pub struct RecordingDispatchApi {
    inner: Mutex<Inner>,
}

impl RecordingDispatchApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = WorkloadStatus>) -> Self {
        self.inner.try_lock().unwrap().statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_output(self, output: ReplicationOutput) -> Self {
        self.inner.try_lock().unwrap().output = Some(output);
        self
    }

    pub fn with_failing_submit(self) -> Self {
        self.inner.try_lock().unwrap().fail_submit = true;
        self
    }

    /// Returns the submitted workloads in submission order.
    pub async fn submitted(&self) -> Vec<(WorkloadId, ReplicationSpec)> {
        self.inner.lock().await.submitted.clone()
    }

    /// Returns the workloads that received a cancel request.
    pub async fn cancelled(&self) -> Vec<WorkloadId> {
        self.inner.lock().await.cancelled.clone()
    }

    /// Returns the number of status polls served.
    pub async fn polled(&self) -> usize {
        self.inner.lock().await.polls
    }
}

#[async_trait]
impl DispatchApi for RecordingDispatchApi {
    async fn submit(
        &self,
        workload_id: &WorkloadId,
        spec: &ReplicationSpec,
    ) -> Result<(), DispatchError> {
        let mut inner = self.inner.lock().await;

        if inner.fail_submit {
            return Err(DispatchError::Request(
                "dispatch service unavailable".to_string(),
            ));
        }

        inner.submitted.push((workload_id.clone(), spec.clone()));

        Ok(())
    }

    async fn status(&self, _workload_id: &WorkloadId) -> Result<WorkloadStatus, DispatchError> {
        let mut inner = self.inner.lock().await;
        inner.polls += 1;

        Ok(inner
            .statuses
            .pop_front()
            .unwrap_or(WorkloadStatus::Running))
    }

    async fn output(
        &self,
        _workload_id: &WorkloadId,
    ) -> Result<Option<ReplicationOutput>, DispatchError> {
        Ok(self.inner.lock().await.output.clone())
    }

    async fn cancel(&self, workload_id: &WorkloadId) -> Result<(), DispatchError> {
        self.inner.lock().await.cancelled.push(workload_id.clone());

        Ok(())
    }
}
