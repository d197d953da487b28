use thiserror::Error;

use crate::dispatch::WorkloadId;

/// Errors raised by the hydration collaborator while expanding an attempt request.
///
/// Hydration failures are fatal for the attempt and not retried here; the caller's
/// scheduling layer owns retries.
#[derive(Debug, Error)]
pub enum HydrationError {
    #[error("The replication spec for the attempt is invalid: {0}")]
    InvalidSpec(String),

    #[error("A dependency required to hydrate the replication spec was unreachable: {0}")]
    DependencyUnavailable(String),

    #[error("Failed to decode the hydrated replication spec: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised while constructing or starting a replication worker.
#[derive(Debug, Error)]
pub enum WorkerLaunchError {
    #[error("No orchestrator binary is configured for in-process execution")]
    OrchestratorBinaryMissing,

    #[error("No dispatch client is configured for remote workload execution")]
    DispatchUnavailable,

    #[error("Failed to spawn the replication process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Failed to submit the replication workload `{workload_id}`: {source}")]
    Submit {
        workload_id: WorkloadId,
        #[source]
        source: DispatchError,
    },
}

/// Errors raised while a replication worker was running.
#[derive(Debug, Error)]
pub enum WorkerExecutionError {
    #[error("An i/o error occurred while driving the replication process: {0}")]
    ProcessIo(#[from] std::io::Error),

    #[error("The replication process exited with {status}: {stderr}")]
    ProcessFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Failed to encode or decode the replication payload: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("The replication workload `{0}` failed without recorded output")]
    WorkloadFailed(WorkloadId),

    #[error("The replication workload `{0}` reached a terminal state without recorded output")]
    MissingOutput(WorkloadId),

    #[error("The dispatch api failed while driving workload `{workload_id}`: {source}")]
    Dispatch {
        workload_id: WorkloadId,
        #[source]
        source: DispatchError,
    },
}

/// The attempt was cancelled by the caller before completion.
///
/// Surfaced as its own type so callers can tell voluntary cancellation from failure.
#[derive(Debug, Error)]
#[error("The replication attempt was cancelled before completion")]
pub struct CancellationError;

/// Errors raised by the remote dispatch collaborator.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("The dispatch api request failed: {0}")]
    Request(String),

    #[error("Failed to encode or decode a dispatch payload: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Errors raised by the payload store collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("An i/o error occurred while writing the payload: {0}")]
    Io(#[from] std::io::Error),

    #[error("The payload store rejected the write: {0}")]
    Rejected(String),
}

impl StorageError {
    /// Short label identifying the failure cause, used as a metric tag.
    pub fn cause_label(&self) -> &'static str {
        match self {
            StorageError::Io(_) => "io",
            StorageError::Rejected(_) => "rejected",
        }
    }
}

/// Composite error returned by a running worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Launch(#[from] WorkerLaunchError),

    #[error(transparent)]
    Execution(#[from] WorkerExecutionError),

    #[error(transparent)]
    Cancelled(#[from] CancellationError),
}

/// The caller-facing error of a replication attempt.
///
/// Offload failures never appear here: they are recovered locally and only logged and
/// counted.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("Failed to hydrate the replication spec: {0}")]
    Hydration(#[from] HydrationError),

    #[error("Failed to launch the replication worker: {0}")]
    WorkerLaunch(#[from] WorkerLaunchError),

    #[error("The replication worker failed: {0}")]
    WorkerExecution(#[from] WorkerExecutionError),

    #[error(transparent)]
    Cancelled(#[from] CancellationError),
}

impl From<WorkerError> for AttemptError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::Launch(err) => AttemptError::WorkerLaunch(err),
            WorkerError::Execution(err) => AttemptError::WorkerExecution(err),
            WorkerError::Cancelled(err) => AttemptError::Cancelled(err),
        }
    }
}
