use telemetry::init_tracing;

use crate::core::start_runner;

mod config;
mod core;
mod hydrate;
mod store;
mod supervision;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_name = env!("CARGO_BIN_NAME");

    let _log_flusher = init_tracing(app_name)?;

    // We execute a single replication attempt and exit.
    start_runner().await?;

    Ok(())
}
