use std::sync::Arc;
use std::time::Duration;

use config::shared::OrchestratorConfig;
use metrics::counter;
use tracing::info;

use crate::attempt::{finalize, mark_backfilled_streams, reduce, streams_to_backfill};
use crate::concurrency::cancel::create_cancel_channel;
use crate::concurrency::heartbeat::{HeartbeatBridge, SupervisionContext};
use crate::dispatch::DispatchApi;
use crate::error::{AttemptError, CancellationError};
use crate::hydration::SpecHydrator;
use crate::metrics::{
    register_metrics, CONNECTION_ID, REPLICATION_ATTEMPTS_TOTAL, REPLICATION_BYTES_SYNCED_TOTAL,
    REPLICATION_RECORDS_SYNCED_TOTAL, RESET_REQUESTS_TOTAL,
};
use crate::storage::PayloadStore;
use crate::types::{AttemptRequest, PayloadReference, ReplicationAttemptSummary, SyncOutput};
use crate::workers::{select_worker, ReplicationWorker};

/// Drives one replication attempt end to end.
///
/// The supervisor owns the strict sequence hydrate → select → run → reduce → backfill →
/// offload. It never parallelizes these steps; the only concurrency is the worker
/// itself and the heartbeat bridge that keeps the caller's supervision context aware of
/// the running attempt. No state crosses attempt boundaries, every attempt owns its
/// spec and worker exclusively.
pub struct AttemptSupervisor<H, P, C> {
    config: Arc<OrchestratorConfig>,
    hydrator: H,
    payload_store: P,
    context: C,
    dispatch: Option<Arc<dyn DispatchApi>>,
}

impl<H, P, C> AttemptSupervisor<H, P, C>
where
    H: SpecHydrator + Send + Sync,
    P: PayloadStore + Send + Sync,
    C: SupervisionContext + Clone,
{
    /// Creates a new supervisor.
    ///
    /// The dispatch client is optional: without one, attempts routed to the remote
    /// backend fail to launch while in-process attempts are unaffected.
    pub fn new(
        config: OrchestratorConfig,
        hydrator: H,
        payload_store: P,
        context: C,
        dispatch: Option<Arc<dyn DispatchApi>>,
    ) -> Self {
        // Register metrics here during supervisor creation to avoid burdening embedders
        // with calling it explicitly. Safe to call multiple times.
        register_metrics();

        Self {
            config: Arc::new(config),
            hydrator,
            payload_store,
            context,
            dispatch,
        }
    }

    /// Executes one replication attempt and returns the reduced, size-bounded output.
    #[tracing::instrument(
        skip(self, request),
        fields(
            connection_id = %request.connection_id,
            job_id = request.job_id,
            attempt_number = request.attempt_number
        )
    )]
    pub async fn execute(&self, request: AttemptRequest) -> Result<SyncOutput, AttemptError> {
        counter!(REPLICATION_ATTEMPTS_TOTAL).increment(1);

        if request.is_reset {
            info!("attempt is a reset request");
            counter!(RESET_REQUESTS_TOTAL).increment(1);
        }

        // The bridge is registered before any work so a crash or stall is externally
        // visible from the first moment, and so an external cancellation raised during
        // hydration still reaches the worker constructed afterwards: the channel holds
        // the signal for late subscribers.
        let (cancel_tx, cancel_rx) = create_cancel_channel();
        let bridge = HeartbeatBridge::start(
            self.context.clone(),
            cancel_tx,
            Duration::from_millis(self.config.heartbeat_interval_ms),
        );

        let spec = self.hydrator.hydrate(&request).await?;

        if cancel_rx.is_cancelled() {
            return Err(CancellationError.into());
        }

        // The backfill decision runs against the configured catalog, the worker
        // consumes the rest of the spec.
        let catalog = spec.catalog.clone();

        let worker = select_worker(
            &request,
            &spec,
            cancel_rx,
            self.dispatch.clone(),
            &self.config,
        )?;

        info!(kind = ?worker.kind(), "selected replication worker");

        let raw = worker.run(spec).await?;

        bridge.stop().await;

        self.record_summary_metrics(&request, &raw.summary);

        let mut output = reduce(raw);

        if let Some(diff) = &request.schema_diff {
            let streams = streams_to_backfill(diff, &catalog);

            info!(
                backfilled_streams = streams.len(),
                "resolved streams requiring a backfill"
            );

            mark_backfilled_streams(&streams, &mut output);
        }

        let reference = PayloadReference::for_attempt(
            request.connection_id,
            request.job_id,
            request.attempt_number,
        );
        let offload_enabled = self.config.offload.is_enabled_for(request.connection_id);

        let output = finalize(
            output,
            &reference,
            self.config.message_size_limit,
            offload_enabled,
            &self.payload_store,
        )
        .await;

        info!(status = ?output.summary.status, "replication attempt completed");

        Ok(output)
    }

    fn record_summary_metrics(
        &self,
        request: &AttemptRequest,
        summary: &ReplicationAttemptSummary,
    ) {
        let connection_id = request.connection_id.to_string();

        counter!(REPLICATION_BYTES_SYNCED_TOTAL, CONNECTION_ID => connection_id.clone())
            .increment(summary.bytes_synced);
        counter!(REPLICATION_RECORDS_SYNCED_TOTAL, CONNECTION_ID => connection_id)
            .increment(summary.records_synced);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::dispatch::WorkloadStatus;
    use crate::error::HydrationError;
    use crate::storage::MemoryPayloadStore;
    use crate::test_utils::{
        breaking_diff, sample_replication_output, sample_request, sample_spec, FailingHydrator,
        ManualSupervision, RecordingDispatchApi, StaticHydrator,
    };
    use crate::types::StreamDescriptor;

    fn test_config() -> OrchestratorConfig {
        OrchestratorConfig {
            heartbeat_interval_ms: 5,
            dispatch_poll_interval_ms: 5,
            cancellation_grace_period_ms: 1_000,
            ..OrchestratorConfig::default()
        }
    }

    fn remote_request() -> AttemptRequest {
        let mut request = sample_request();
        request.use_remote_dispatch = Some(true);
        request
    }

    fn supervisor(
        config: OrchestratorConfig,
        hydrator: StaticHydrator,
        api: Arc<RecordingDispatchApi>,
        context: ManualSupervision,
    ) -> AttemptSupervisor<StaticHydrator, MemoryPayloadStore, ManualSupervision> {
        AttemptSupervisor::new(
            config,
            hydrator,
            MemoryPayloadStore::new(),
            context,
            Some(api as Arc<dyn DispatchApi>),
        )
    }

    #[tokio::test]
    async fn runs_an_attempt_to_completion_through_the_remote_backend() {
        telemetry::init_test_tracing();

        let expected = sample_replication_output();
        let api = Arc::new(
            RecordingDispatchApi::new()
                .with_statuses([WorkloadStatus::Running, WorkloadStatus::Succeeded])
                .with_output(expected.clone()),
        );
        let context = ManualSupervision::new();

        let supervisor = supervisor(
            test_config(),
            StaticHydrator::new(sample_spec()),
            api.clone(),
            context.clone(),
        );

        let output = supervisor.execute(remote_request()).await.unwrap();

        assert_eq!(output.summary.bytes_synced, expected.summary.bytes_synced);
        assert_eq!(output.summary.status, expected.summary.status);
        assert!(output.payload_reference.is_none());
        assert_eq!(api.submitted().await.len(), 1);
        assert!(context.heartbeats() > 0);
    }

    #[tokio::test]
    async fn reset_requests_follow_the_normal_success_path() {
        let api = Arc::new(
            RecordingDispatchApi::new()
                .with_statuses([WorkloadStatus::Succeeded])
                .with_output(sample_replication_output()),
        );

        let mut request = remote_request();
        request.is_reset = true;

        let supervisor = supervisor(
            test_config(),
            StaticHydrator::new(sample_spec()),
            api,
            ManualSupervision::new(),
        );

        let output = supervisor.execute(request).await;

        assert!(output.is_ok());
    }

    #[tokio::test]
    async fn records_backfilled_streams_when_a_diff_is_present() {
        let api = Arc::new(
            RecordingDispatchApi::new()
                .with_statuses([WorkloadStatus::Succeeded])
                .with_output(sample_replication_output()),
        );

        let mut request = remote_request();
        request.schema_diff = Some(breaking_diff());

        let supervisor = supervisor(
            test_config(),
            StaticHydrator::new(sample_spec()),
            api,
            ManualSupervision::new(),
        );

        let output = supervisor.execute(request).await.unwrap();

        assert_eq!(
            output.backfilled_streams,
            vec![StreamDescriptor::with_namespace("users", "public")]
        );
    }

    #[tokio::test]
    async fn hydration_failure_short_circuits_before_any_worker_is_constructed() {
        let api = Arc::new(RecordingDispatchApi::new());

        let supervisor = AttemptSupervisor::new(
            test_config(),
            FailingHydrator,
            MemoryPayloadStore::new(),
            ManualSupervision::new(),
            Some(api.clone() as Arc<dyn DispatchApi>),
        );

        let err = supervisor.execute(remote_request()).await.unwrap_err();

        assert!(matches!(
            err,
            AttemptError::Hydration(HydrationError::DependencyUnavailable(_))
        ));
        assert!(api.submitted().await.is_empty());
        assert!(api.polled().await == 0);
    }

    #[tokio::test]
    async fn external_cancellation_mid_run_surfaces_as_cancelled() {
        // No terminal status: the remote workload keeps running until cancelled.
        let api = Arc::new(RecordingDispatchApi::new());
        let context = ManualSupervision::new();

        let supervisor = supervisor(
            test_config(),
            StaticHydrator::new(sample_spec()),
            api.clone(),
            context.clone(),
        );

        let started = Instant::now();
        let request = remote_request();

        let execute = supervisor.execute(request);
        tokio::pin!(execute);

        // Let the attempt get going, then request cancellation externally.
        tokio::select! {
            _ = &mut execute => panic!("attempt should still be running"),
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
        }
        context.request_cancellation();

        let err = execute.await.unwrap_err();

        assert!(matches!(err, AttemptError::Cancelled(_)));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(api.cancelled().await.len(), 1);
    }

    #[tokio::test]
    async fn oversized_outputs_are_offloaded_for_enabled_connections() {
        let api = Arc::new(
            RecordingDispatchApi::new()
                .with_statuses([WorkloadStatus::Succeeded])
                .with_output(sample_replication_output()),
        );

        let request = remote_request();

        let mut config = test_config();
        config.message_size_limit = 64;
        config.offload.enabled_connections = vec![request.connection_id];

        let store = MemoryPayloadStore::new();
        let supervisor = AttemptSupervisor::new(
            config,
            StaticHydrator::new(sample_spec()),
            store.clone(),
            ManualSupervision::new(),
            Some(api as Arc<dyn DispatchApi>),
        );

        let output = supervisor.execute(request.clone()).await.unwrap();

        let reference = PayloadReference::for_attempt(
            request.connection_id,
            request.job_id,
            request.attempt_number,
        );
        assert_eq!(output.payload_reference, Some(reference.clone()));
        assert_eq!(store.writes().await, 1);
        assert!(store.payload(&reference.storage_key()).await.is_some());
    }
}
