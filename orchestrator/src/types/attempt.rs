use config::SerializableSecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::diff::SchemaDiff;
use crate::types::stream::Catalog;

/// Identifies the job execution an attempt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JobRunConfig {
    pub job_id: u64,
    pub attempt_number: u32,
}

/// The lightweight input of a replication attempt.
///
/// Deliberately carries no catalog, no cursor state and no secrets so it stays cheap to
/// move through the caller's workflow engine; the hydration collaborator expands it into
/// a [`ReplicationSpec`] at execution time. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttemptRequest {
    pub connection_id: Uuid,
    pub job_id: u64,
    pub attempt_number: u32,
    pub source_image: String,
    pub destination_image: String,
    /// Whether this attempt clears destination data instead of syncing new records.
    #[serde(default)]
    pub is_reset: bool,
    /// Routes the attempt to the remote dispatch backend when `Some(true)`; unset
    /// behaves like `Some(false)`. Exists so execution backends can be migrated one
    /// connection at a time.
    #[serde(default)]
    pub use_remote_dispatch: Option<bool>,
    /// Diff applied by the preceding schema refresh, if one ran.
    #[serde(default)]
    pub schema_diff: Option<SchemaDiff>,
}

/// Launcher configuration of one side of the replication.
///
/// The connector config carries resolved credentials: it is wrapped in a secret string
/// so it never appears in `Debug` output or logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectorSpec {
    pub image: String,
    pub config: SerializableSecretString,
}

/// The fully hydrated input of a replication attempt.
///
/// Owned exclusively by one attempt execution, produced once per attempt by the
/// hydration collaborator and discarded at attempt end. Contains secrets: must never be
/// logged or persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReplicationSpec {
    pub catalog: Catalog,
    /// Opaque cursor/checkpoint state from the previous attempt, if any.
    #[serde(default)]
    pub state: Option<serde_json::Value>,
    pub source: ConnectorSpec,
    pub destination: ConnectorSpec,
    pub job_run: JobRunConfig,
}
