use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use config::shared::OrchestratorConfig;

use crate::concurrency::cancel::CancelRx;
use crate::dispatch::{DispatchApi, WorkloadId};
use crate::error::{WorkerError, WorkerLaunchError};
use crate::types::{AttemptRequest, ReplicationOutput, ReplicationSpec};
use crate::workers::process::ProcessWorker;
use crate::workers::remote::DispatchWorker;

/// A worker that executes the data movement of one replication attempt.
///
/// Exactly one worker exists per attempt and it is exclusively owned by the attempt
/// supervisor, which is why `run` consumes the worker. Cancellation reaches the worker
/// through the cancellation channel it subscribed to at construction; after a
/// cancellation `run` must return within the configured grace period.
pub trait ReplicationWorker {
    /// Runs the replication to completion and returns the detailed worker output.
    fn run(
        self,
        spec: ReplicationSpec,
    ) -> impl Future<Output = Result<ReplicationOutput, WorkerError>> + Send;
}

/// The execution backend a worker runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerKind {
    InProcess,
    RemoteDispatch,
}

/// The worker selected for an attempt.
///
/// Closed over the two supported execution backends: selection happens through explicit
/// configuration, never runtime type inspection, so the two backends can be migrated
/// between without callers noticing.
#[derive(Debug)]
pub enum SelectedWorker {
    InProcess(ProcessWorker),
    RemoteDispatch(DispatchWorker),
}

impl SelectedWorker {
    pub fn kind(&self) -> WorkerKind {
        match self {
            SelectedWorker::InProcess(_) => WorkerKind::InProcess,
            SelectedWorker::RemoteDispatch(_) => WorkerKind::RemoteDispatch,
        }
    }
}

impl ReplicationWorker for SelectedWorker {
    async fn run(self, spec: ReplicationSpec) -> Result<ReplicationOutput, WorkerError> {
        match self {
            SelectedWorker::InProcess(worker) => worker.run(spec).await,
            SelectedWorker::RemoteDispatch(worker) => worker.run(spec).await,
        }
    }
}

/// Selects the worker backend for an attempt.
///
/// An unset routing flag behaves like `Some(false)` and selects the in-process backend;
/// `Some(true)` selects remote dispatch. Construction can fail, the selector itself
/// never retries.
pub fn select_worker(
    request: &AttemptRequest,
    spec: &ReplicationSpec,
    cancel_rx: CancelRx,
    dispatch: Option<Arc<dyn DispatchApi>>,
    config: &OrchestratorConfig,
) -> Result<SelectedWorker, WorkerLaunchError> {
    let grace_period = Duration::from_millis(config.cancellation_grace_period_ms);

    if request.use_remote_dispatch.unwrap_or(false) {
        let api = dispatch.ok_or(WorkerLaunchError::DispatchUnavailable)?;
        let workload_id =
            WorkloadId::for_attempt(request.connection_id, request.job_id, request.attempt_number);

        let worker = DispatchWorker::new(
            api,
            workload_id,
            cancel_rx,
            Duration::from_millis(config.dispatch_poll_interval_ms),
            grace_period,
        );

        return Ok(SelectedWorker::RemoteDispatch(worker));
    }

    let worker = ProcessWorker::new(
        &config.orchestrator_binary,
        spec.job_run,
        spec.source.image.clone(),
        spec.destination.image.clone(),
        cancel_rx,
        grace_period,
    )?;

    Ok(SelectedWorker::InProcess(worker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::cancel::create_cancel_channel;
    use crate::test_utils::{sample_request, sample_spec, RecordingDispatchApi};

    fn dispatch_api() -> Arc<dyn DispatchApi> {
        Arc::new(RecordingDispatchApi::new())
    }

    #[test]
    fn unset_routing_flag_selects_the_in_process_backend() {
        let request = sample_request();
        let (_, cancel_rx) = create_cancel_channel();

        let worker = select_worker(
            &request,
            &sample_spec(),
            cancel_rx,
            Some(dispatch_api()),
            &OrchestratorConfig::default(),
        )
        .unwrap();

        assert_eq!(worker.kind(), WorkerKind::InProcess);
    }

    #[test]
    fn false_routing_flag_selects_the_in_process_backend() {
        let mut request = sample_request();
        request.use_remote_dispatch = Some(false);
        let (_, cancel_rx) = create_cancel_channel();

        let worker = select_worker(
            &request,
            &sample_spec(),
            cancel_rx,
            Some(dispatch_api()),
            &OrchestratorConfig::default(),
        )
        .unwrap();

        assert_eq!(worker.kind(), WorkerKind::InProcess);
    }

    #[test]
    fn true_routing_flag_selects_the_remote_dispatch_backend() {
        let mut request = sample_request();
        request.use_remote_dispatch = Some(true);
        let (_, cancel_rx) = create_cancel_channel();

        let worker = select_worker(
            &request,
            &sample_spec(),
            cancel_rx,
            Some(dispatch_api()),
            &OrchestratorConfig::default(),
        )
        .unwrap();

        assert_eq!(worker.kind(), WorkerKind::RemoteDispatch);
    }

    #[test]
    fn remote_dispatch_without_a_client_fails_to_launch() {
        let mut request = sample_request();
        request.use_remote_dispatch = Some(true);
        let (_, cancel_rx) = create_cancel_channel();

        let result = select_worker(
            &request,
            &sample_spec(),
            cancel_rx,
            None,
            &OrchestratorConfig::default(),
        );

        assert!(matches!(result, Err(WorkerLaunchError::DispatchUnavailable)));
    }

    #[test]
    fn missing_orchestrator_binary_fails_to_launch() {
        let request = sample_request();
        let (_, cancel_rx) = create_cancel_channel();

        let config = OrchestratorConfig {
            orchestrator_binary: String::new(),
            ..OrchestratorConfig::default()
        };

        let result = select_worker(&request, &sample_spec(), cancel_rx, None, &config);

        assert!(matches!(
            result,
            Err(WorkerLaunchError::OrchestratorBinaryMissing)
        ));
    }
}
