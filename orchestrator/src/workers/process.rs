use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::concurrency::cancel::CancelRx;
use crate::error::{CancellationError, WorkerError, WorkerExecutionError, WorkerLaunchError};
use crate::types::{JobRunConfig, ReplicationOutput, ReplicationSpec};
use crate::workers::base::ReplicationWorker;

/// Worker that runs the replication in a locally spawned orchestrator process.
///
/// The full spec is handed over stdin so secrets never appear on the command line, and
/// the detailed worker output is read back from stdout. Cancellation kills the child
/// and waits out the grace period instead of hanging on it.
#[derive(Debug)]
pub struct ProcessWorker {
    binary: PathBuf,
    job_run: JobRunConfig,
    source_image: String,
    destination_image: String,
    cancel_rx: CancelRx,
    grace_period: Duration,
}

impl ProcessWorker {
    pub(crate) fn new(
        binary: &str,
        job_run: JobRunConfig,
        source_image: String,
        destination_image: String,
        cancel_rx: CancelRx,
        grace_period: Duration,
    ) -> Result<Self, WorkerLaunchError> {
        if binary.is_empty() {
            return Err(WorkerLaunchError::OrchestratorBinaryMissing);
        }

        Ok(Self {
            binary: PathBuf::from(binary),
            job_run,
            source_image,
            destination_image,
            cancel_rx,
            grace_period,
        })
    }
}

impl ReplicationWorker for ProcessWorker {
    async fn run(mut self, spec: ReplicationSpec) -> Result<ReplicationOutput, WorkerError> {
        if self.cancel_rx.is_cancelled() {
            return Err(CancellationError.into());
        }

        let payload = serde_json::to_vec(&spec).map_err(WorkerExecutionError::Codec)?;

        let mut command = Command::new(&self.binary);
        command
            .arg("--job-id")
            .arg(self.job_run.job_id.to_string())
            .arg("--attempt-number")
            .arg(self.job_run.attempt_number.to_string())
            .arg("--source-image")
            .arg(&self.source_image)
            .arg("--destination-image")
            .arg(&self.destination_image)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        info!(
            job_id = self.job_run.job_id,
            attempt_number = self.job_run.attempt_number,
            "spawning replication process"
        );

        let mut child = command.spawn().map_err(WorkerLaunchError::Spawn)?;

        // Drain both pipes from the start, otherwise a chatty child can fill a pipe
        // buffer and deadlock against our stdin write.
        let stdout_task = drain_pipe(child.stdout.take());
        let stderr_task = drain_pipe(child.stderr.take());

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| WorkerExecutionError::ProcessIo(other_io("child stdin unavailable")))?;
        stdin
            .write_all(&payload)
            .await
            .map_err(WorkerExecutionError::ProcessIo)?;
        // Closing the pipe signals end of input to the child.
        drop(stdin);

        let status = tokio::select! {
            status = child.wait() => status.map_err(WorkerExecutionError::ProcessIo)?,
            _ = self.cancel_rx.cancelled() => {
                info!("cancellation requested, killing the replication process");

                let _ = child.start_kill();
                if tokio::time::timeout(self.grace_period, child.wait()).await.is_err() {
                    warn!("replication process did not exit within the cancellation grace period");
                }

                stdout_task.abort();
                stderr_task.abort();

                return Err(CancellationError.into());
            }
        };

        let stdout = join_pipe(stdout_task).await?;
        let stderr = join_pipe(stderr_task).await?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            return Err(WorkerExecutionError::ProcessFailed { status, stderr }.into());
        }

        let output: ReplicationOutput =
            serde_json::from_slice(&stdout).map_err(WorkerExecutionError::Codec)?;

        info!(
            job_id = self.job_run.job_id,
            attempt_number = self.job_run.attempt_number,
            "replication process completed"
        );

        Ok(output)
    }
}

fn other_io(message: &str) -> std::io::Error {
    std::io::Error::other(message.to_string())
}

/// Reads a child pipe to the end on a separate task.
fn drain_pipe<R>(pipe: Option<R>) -> JoinHandle<Result<Vec<u8>, std::io::Error>>
where
    R: AsyncReadExt + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buffer).await?;
        }

        Ok(buffer)
    })
}

async fn join_pipe(
    task: JoinHandle<Result<Vec<u8>, std::io::Error>>,
) -> Result<Vec<u8>, WorkerExecutionError> {
    match task.await {
        Ok(result) => result.map_err(WorkerExecutionError::ProcessIo),
        Err(err) => Err(WorkerExecutionError::ProcessIo(other_io(&format!(
            "pipe reader task failed: {err}"
        )))),
    }
}
