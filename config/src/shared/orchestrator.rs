use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::ValidationError;

/// Default ceiling, in bytes, for the serialized size of an in-band sync output.
pub const DEFAULT_MESSAGE_SIZE_LIMIT: usize = 2 * 1024 * 1024;

/// Default interval, in milliseconds, between liveness heartbeats.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 10_000;

/// Default grace period, in milliseconds, for a worker to return after cancellation.
pub const DEFAULT_CANCELLATION_GRACE_PERIOD_MS: u64 = 30_000;

/// Default interval, in milliseconds, between remote workload status polls.
pub const DEFAULT_DISPATCH_POLL_INTERVAL_MS: u64 = 1_000;

/// Configuration for the replication attempt orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrchestratorConfig {
    /// Path to the orchestrator executable spawned by the in-process worker.
    pub orchestrator_binary: String,
    /// Maximum serialized size, in bytes, of a sync output returned in-band.
    #[serde(default = "default_message_size_limit")]
    pub message_size_limit: usize,
    /// Interval, in milliseconds, between liveness heartbeats sent to the caller's
    /// supervision context while a worker is running.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Maximum time, in milliseconds, a worker may take to return after its
    /// cancellation has been requested.
    #[serde(default = "default_cancellation_grace_period_ms")]
    pub cancellation_grace_period_ms: u64,
    /// Interval, in milliseconds, between status polls of a remotely dispatched
    /// workload.
    #[serde(default = "default_dispatch_poll_interval_ms")]
    pub dispatch_poll_interval_ms: u64,
    /// Configuration for offloading oversized sync outputs to external storage.
    #[serde(default)]
    pub offload: OffloadConfig,
}

/// Configuration gating the offload of oversized sync outputs.
///
/// Offload can be enabled globally or for an explicit set of connections, which allows
/// rolling the behavior out one connection at a time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OffloadConfig {
    /// Enables offload for every connection.
    #[serde(default)]
    pub enabled: bool,
    /// Connections for which offload is enabled even when `enabled` is false.
    #[serde(default)]
    pub enabled_connections: Vec<Uuid>,
}

impl OffloadConfig {
    /// Returns whether offload is enabled for the given connection.
    ///
    /// Resolved once per attempt so the offload step stays a pure function of its
    /// inputs.
    pub fn is_enabled_for(&self, connection_id: Uuid) -> bool {
        self.enabled || self.enabled_connections.contains(&connection_id)
    }
}

impl OrchestratorConfig {
    /// Validates the loaded [`OrchestratorConfig`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.orchestrator_binary.is_empty() {
            return Err(ValidationError::InvalidOrchestrator(
                "orchestrator_binary cannot be empty".to_string(),
            ));
        }

        if self.message_size_limit == 0 {
            return Err(ValidationError::InvalidOrchestrator(
                "message_size_limit must be greater than zero".to_string(),
            ));
        }

        if self.heartbeat_interval_ms == 0 {
            return Err(ValidationError::InvalidOrchestrator(
                "heartbeat_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.cancellation_grace_period_ms == 0 {
            return Err(ValidationError::InvalidOrchestrator(
                "cancellation_grace_period_ms must be greater than zero".to_string(),
            ));
        }

        if self.dispatch_poll_interval_ms == 0 {
            return Err(ValidationError::InvalidOrchestrator(
                "dispatch_poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            orchestrator_binary: "replication-orchestrator".to_string(),
            message_size_limit: DEFAULT_MESSAGE_SIZE_LIMIT,
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            cancellation_grace_period_ms: DEFAULT_CANCELLATION_GRACE_PERIOD_MS,
            dispatch_poll_interval_ms: DEFAULT_DISPATCH_POLL_INTERVAL_MS,
            offload: OffloadConfig::default(),
        }
    }
}

fn default_message_size_limit() -> usize {
    DEFAULT_MESSAGE_SIZE_LIMIT
}

fn default_heartbeat_interval_ms() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL_MS
}

fn default_cancellation_grace_period_ms() -> u64 {
    DEFAULT_CANCELLATION_GRACE_PERIOD_MS
}

fn default_dispatch_poll_interval_ms() -> u64 {
    DEFAULT_DISPATCH_POLL_INTERVAL_MS
}
