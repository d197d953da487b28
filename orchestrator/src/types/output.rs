use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::stream::{Catalog, StreamDescriptor};

/// Name of the artifact under which a full sync output is offloaded.
pub const REPLICATION_OUTPUT_ARTIFACT: &str = "replication-output";

/// Version tag of the offloaded payload format.
const PAYLOAD_VERSION: &str = "v1";

/// Terminal status of a replication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationStatus {
    Completed,
    Failed,
    Cancelled,
    PartialSuccess,
}

/// Volume counters of an attempt or of a single stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncStats {
    pub records_emitted: u64,
    pub bytes_emitted: u64,
    pub records_committed: u64,
    pub bytes_committed: u64,
}

/// Per-stream volume counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamSyncStats {
    pub stream: StreamDescriptor,
    pub stats: SyncStats,
}

/// The side of the replication a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureOrigin {
    Source,
    Destination,
    Replication,
    Unknown,
}

/// A failure recorded by the worker while the attempt kept going.
///
/// Partial failures are data, not errors: they ride along inside the worker output and
/// the reduced sync output so the caller can inspect them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FailureReason {
    pub origin: FailureOrigin,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Summary of a replication attempt as reported by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReplicationAttemptSummary {
    pub bytes_synced: u64,
    pub records_synced: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReplicationStatus,
    pub total_stats: SyncStats,
    pub stream_stats: Vec<StreamSyncStats>,
    /// Opaque performance measurements reported by the worker.
    #[serde(default)]
    pub performance_metrics: Option<serde_json::Value>,
}

/// The detailed output produced by a replication worker.
///
/// Produced exactly once per attempt and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReplicationOutput {
    /// Cursor/checkpoint state to persist for the next attempt.
    #[serde(default)]
    pub state: Option<serde_json::Value>,
    pub output_catalog: Catalog,
    pub summary: ReplicationAttemptSummary,
    #[serde(default)]
    pub failures: Vec<FailureReason>,
}

/// Caller-facing summary of a completed attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncSummary {
    pub bytes_synced: u64,
    pub records_synced: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReplicationStatus,
    pub total_stats: SyncStats,
    pub stream_stats: Vec<StreamSyncStats>,
    #[serde(default)]
    pub performance_metrics: Option<serde_json::Value>,
}

/// Reference to a sync output persisted in external storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PayloadReference {
    pub id: String,
    pub version: String,
}

impl PayloadReference {
    /// Builds the deterministic reference of an attempt's offloaded output.
    pub fn for_attempt(connection_id: Uuid, job_id: u64, attempt_number: u32) -> Self {
        Self {
            id: format!("{connection_id}/{job_id}/{attempt_number}/{REPLICATION_OUTPUT_ARTIFACT}"),
            version: PAYLOAD_VERSION.to_string(),
        }
    }

    /// Returns the key the payload is stored under.
    pub fn storage_key(&self) -> String {
        format!("{}/{}", self.version, self.id)
    }
}

/// The reduced, size-bounded artifact returned to the caller of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncOutput {
    #[serde(default)]
    pub state: Option<serde_json::Value>,
    pub output_catalog: Catalog,
    pub summary: SyncSummary,
    #[serde(default)]
    pub failures: Vec<FailureReason>,
    /// Streams fully re-synced during this attempt after a breaking schema change.
    #[serde(default)]
    pub backfilled_streams: Vec<StreamDescriptor>,
    /// Set when the full output was offloaded to external storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_reference: Option<PayloadReference>,
}
