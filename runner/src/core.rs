use anyhow::Context;
use orchestrator::attempt::AttemptSupervisor;
use orchestrator::types::{AttemptRequest, SyncOutput};
use tracing::info;

use crate::config::{load_runner_config, RunnerConfig};
use crate::hydrate::FileSpecHydrator;
use crate::store::FsPayloadStore;
use crate::supervision::SignalSupervision;

pub async fn start_runner() -> anyhow::Result<()> {
    info!("starting attempt runner");

    let runner_config = load_runner_config()?;
    runner_config.orchestrator.validate()?;

    log_config(&runner_config);

    let request = read_request(&runner_config.request_path).await?;

    let hydrator = FileSpecHydrator::new(&runner_config.spec_path);
    let payload_store = FsPayloadStore::new(&runner_config.payload_dir);
    let context = SignalSupervision::install();

    // The runner only wires the in-process backend: attempts routed to remote dispatch
    // fail to launch, which is the right behavior for a local tool.
    let supervisor = AttemptSupervisor::new(
        runner_config.orchestrator.clone(),
        hydrator,
        payload_store,
        context,
        None,
    );

    let output = supervisor.execute(request).await?;

    write_output(runner_config.output_path.as_deref(), &output)?;

    info!("attempt runner completed");

    Ok(())
}

fn log_config(config: &RunnerConfig) {
    info!(
        request_path = config.request_path,
        spec_path = config.spec_path,
        payload_dir = config.payload_dir,
        "runner config"
    );
    info!(
        orchestrator_binary = config.orchestrator.orchestrator_binary,
        message_size_limit = config.orchestrator.message_size_limit,
        heartbeat_interval_ms = config.orchestrator.heartbeat_interval_ms,
        cancellation_grace_period_ms = config.orchestrator.cancellation_grace_period_ms,
        offload_enabled = config.orchestrator.offload.enabled,
        "orchestrator config"
    );
}

async fn read_request(path: &str) -> anyhow::Result<AttemptRequest> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read the attempt request at {path}"))?;

    let request = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to decode the attempt request at {path}"))?;

    Ok(request)
}

fn write_output(path: Option<&str>, output: &SyncOutput) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(output)?;

    match path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write the sync output to {path}"))?;

            info!(path, "sync output written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
