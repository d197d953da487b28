use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::concurrency::cancel::CancelRx;
use crate::dispatch::{DispatchApi, WorkloadId, WorkloadStatus};
use crate::error::{CancellationError, WorkerError, WorkerExecutionError, WorkerLaunchError};
use crate::types::{ReplicationOutput, ReplicationSpec};
use crate::workers::base::ReplicationWorker;

/// Worker that delegates the replication to an externally dispatched workload.
///
/// Submits the spec under a deterministic workload id, then polls the dispatch api
/// until the workload reaches a terminal state. A failed workload that recorded output
/// still returns that output: its failures travel as data, not as an error.
pub struct DispatchWorker {
    api: Arc<dyn DispatchApi>,
    workload_id: WorkloadId,
    cancel_rx: CancelRx,
    poll_interval: Duration,
    grace_period: Duration,
}

impl std::fmt::Debug for DispatchWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchWorker")
            .field("workload_id", &self.workload_id)
            .field("poll_interval", &self.poll_interval)
            .field("grace_period", &self.grace_period)
            .finish_non_exhaustive()
    }
}

impl DispatchWorker {
    pub(crate) fn new(
        api: Arc<dyn DispatchApi>,
        workload_id: WorkloadId,
        cancel_rx: CancelRx,
        poll_interval: Duration,
        grace_period: Duration,
    ) -> Self {
        Self {
            api,
            workload_id,
            cancel_rx,
            poll_interval,
            grace_period,
        }
    }

    fn execution_error(&self, source: crate::error::DispatchError) -> WorkerError {
        WorkerExecutionError::Dispatch {
            workload_id: self.workload_id.clone(),
            source,
        }
        .into()
    }

    async fn fetch_output(&self, status: WorkloadStatus) -> Result<ReplicationOutput, WorkerError> {
        let output = self
            .api
            .output(&self.workload_id)
            .await
            .map_err(|source| self.execution_error(source))?;

        match (output, status) {
            // A failed workload with recorded output carries its failures as data.
            (Some(output), _) => Ok(output),
            (None, WorkloadStatus::Failed) => {
                Err(WorkerExecutionError::WorkloadFailed(self.workload_id.clone()).into())
            }
            (None, _) => {
                Err(WorkerExecutionError::MissingOutput(self.workload_id.clone()).into())
            }
        }
    }

    async fn cancel_remote(&self) {
        // Best effort: the dispatch service reconciles abandoned workloads on its own.
        match tokio::time::timeout(self.grace_period, self.api.cancel(&self.workload_id)).await {
            Ok(Ok(())) => info!(workload_id = %self.workload_id, "remote workload cancelled"),
            Ok(Err(err)) => warn!(
                workload_id = %self.workload_id,
                "failed to cancel the remote workload: {err}"
            ),
            Err(_) => warn!(
                workload_id = %self.workload_id,
                "timed out while cancelling the remote workload"
            ),
        }
    }
}

impl ReplicationWorker for DispatchWorker {
    async fn run(mut self, spec: ReplicationSpec) -> Result<ReplicationOutput, WorkerError> {
        if self.cancel_rx.is_cancelled() {
            return Err(CancellationError.into());
        }

        self.api
            .submit(&self.workload_id, &spec)
            .await
            .map_err(|source| WorkerLaunchError::Submit {
                workload_id: self.workload_id.clone(),
                source,
            })?;

        info!(workload_id = %self.workload_id, "submitted replication workload");

        let mut ticker = tokio::time::interval(self.poll_interval);
        let mut cancel_rx = self.cancel_rx.clone();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let status = self
                        .api
                        .status(&self.workload_id)
                        .await
                        .map_err(|source| self.execution_error(source))?;

                    if !status.is_terminal() {
                        continue;
                    }

                    info!(workload_id = %self.workload_id, ?status, "replication workload reached a terminal state");

                    return match status {
                        WorkloadStatus::Succeeded | WorkloadStatus::Failed => {
                            self.fetch_output(status).await
                        }
                        WorkloadStatus::Cancelled => Err(CancellationError.into()),
                        WorkloadStatus::Pending | WorkloadStatus::Running => unreachable!(),
                    };
                }
                _ = cancel_rx.cancelled() => {
                    info!(workload_id = %self.workload_id, "cancellation requested, cancelling the remote workload");

                    self.cancel_remote().await;

                    return Err(CancellationError.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::concurrency::cancel::create_cancel_channel;
    use crate::dispatch::WorkloadStatus;
    use crate::test_utils::{sample_replication_output, sample_spec, RecordingDispatchApi};
    use crate::types::{FailureOrigin, FailureReason, ReplicationStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn workload_id() -> WorkloadId {
        WorkloadId::for_attempt(Uuid::new_v4(), 7, 1)
    }

    fn worker(api: Arc<RecordingDispatchApi>, cancel_rx: CancelRx) -> DispatchWorker {
        DispatchWorker::new(
            api,
            workload_id(),
            cancel_rx,
            Duration::from_millis(5),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn returns_the_recorded_output_of_a_succeeded_workload() {
        let expected = sample_replication_output();
        let api = Arc::new(
            RecordingDispatchApi::new()
                .with_statuses([WorkloadStatus::Pending, WorkloadStatus::Succeeded])
                .with_output(expected.clone()),
        );

        let (_, cancel_rx) = create_cancel_channel();
        let output = worker(api.clone(), cancel_rx)
            .run(sample_spec())
            .await
            .unwrap();

        assert_eq!(output, expected);
        assert_eq!(api.submitted().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_workload_with_output_carries_failures_as_data() {
        let mut recorded = sample_replication_output();
        recorded.summary.status = ReplicationStatus::Failed;
        recorded.failures.push(FailureReason {
            origin: FailureOrigin::Source,
            message: "source connector lost its connection".to_string(),
            timestamp: Utc::now(),
        });

        let api = Arc::new(
            RecordingDispatchApi::new()
                .with_statuses([WorkloadStatus::Running, WorkloadStatus::Failed])
                .with_output(recorded.clone()),
        );

        let (_, cancel_rx) = create_cancel_channel();
        let output = worker(api, cancel_rx).run(sample_spec()).await.unwrap();

        assert_eq!(output.summary.status, ReplicationStatus::Failed);
        assert_eq!(output.failures.len(), recorded.failures.len());
    }

    #[tokio::test]
    async fn failed_workload_without_output_is_an_execution_error() {
        let api = Arc::new(
            RecordingDispatchApi::new().with_statuses([WorkloadStatus::Failed]),
        );

        let (_, cancel_rx) = create_cancel_channel();
        let err = worker(api, cancel_rx)
            .run(sample_spec())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkerError::Execution(WorkerExecutionError::WorkloadFailed(_))
        ));
    }

    #[tokio::test]
    async fn remotely_cancelled_workload_surfaces_as_cancellation() {
        let api = Arc::new(
            RecordingDispatchApi::new().with_statuses([WorkloadStatus::Cancelled]),
        );

        let (_, cancel_rx) = create_cancel_channel();
        let err = worker(api, cancel_rx)
            .run(sample_spec())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkerError::Cancelled(_)));
    }

    #[tokio::test]
    async fn local_cancellation_cancels_the_remote_workload() {
        // No terminal status: the workload keeps running until cancelled.
        let api = Arc::new(RecordingDispatchApi::new());

        let (cancel_tx, cancel_rx) = create_cancel_channel();
        let started = Instant::now();
        let run = tokio::spawn(worker(api.clone(), cancel_rx).run(sample_spec()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel_tx.cancel();

        let err = run.await.unwrap().unwrap_err();

        assert!(matches!(err, WorkerError::Cancelled(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(api.cancelled().await.len(), 1);
    }

    #[tokio::test]
    async fn submit_failure_is_a_launch_error() {
        let api = Arc::new(RecordingDispatchApi::new().with_failing_submit());

        let (_, cancel_rx) = create_cancel_channel();
        let err = worker(api, cancel_rx)
            .run(sample_spec())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkerError::Launch(WorkerLaunchError::Submit { .. })
        ));
    }
}
