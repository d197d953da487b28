use std::sync::Once;

use metrics::{describe_counter, Unit};

static REGISTER_METRICS: Once = Once::new();

pub const REPLICATION_ATTEMPTS_TOTAL: &str = "orchestrator_replication_attempts_total";
pub const RESET_REQUESTS_TOTAL: &str = "orchestrator_reset_requests_total";
pub const REPLICATION_BYTES_SYNCED_TOTAL: &str = "orchestrator_replication_bytes_synced_total";
pub const REPLICATION_RECORDS_SYNCED_TOTAL: &str = "orchestrator_replication_records_synced_total";
pub const PAYLOAD_WRITE_FAILURES_TOTAL: &str = "orchestrator_payload_write_failures_total";

pub const CONNECTION_ID: &str = "connection_id";
pub const REFERENCE_ID: &str = "reference_id";
pub const REFERENCE_VERSION: &str = "reference_version";
pub const FAILURE_CAUSE: &str = "failure_cause";

/// Registers the metrics emitted by the orchestrator. This should be called before
/// executing an attempt. It is safe to call this method multiple times, the metrics are
/// guaranteed to be registered only once.
pub(crate) fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            REPLICATION_ATTEMPTS_TOTAL,
            Unit::Count,
            "Total number of replication attempts executed"
        );

        describe_counter!(
            RESET_REQUESTS_TOTAL,
            Unit::Count,
            "Total number of attempts that were reset requests"
        );

        describe_counter!(
            REPLICATION_BYTES_SYNCED_TOTAL,
            Unit::Bytes,
            "Total number of bytes synced across replication attempts"
        );

        describe_counter!(
            REPLICATION_RECORDS_SYNCED_TOTAL,
            Unit::Count,
            "Total number of records synced across replication attempts"
        );

        describe_counter!(
            PAYLOAD_WRITE_FAILURES_TOTAL,
            Unit::Count,
            "Total number of failed writes of oversized sync outputs to the payload store"
        );
    });
}
