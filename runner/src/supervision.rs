use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use orchestrator::concurrency::heartbeat::SupervisionContext;
use tracing::{debug, info};

/// Supervision context driven by process signals.
///
/// SIGINT and SIGTERM (sent by Kubernetes before SIGKILL during pod termination) flag
/// the attempt as cancelled, which the heartbeat bridge forwards into the running
/// worker. Heartbeats only show up as debug logs, there is no external supervisor to
/// notify in a local run.
#[derive(Debug, Clone)]
pub struct SignalSupervision {
    cancelled: Arc<AtomicBool>,
}

impl SignalSupervision {
    /// Installs the signal listener and returns the context.
    pub fn install() -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));

        let flag = cancelled.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("SIGINT (Ctrl+C) received, cancelling the running attempt");
                }
                _ = sigterm.recv() => {
                    info!("SIGTERM received, cancelling the running attempt");
                }
            }

            flag.store(true, Ordering::SeqCst);
        });

        Self { cancelled }
    }
}

impl SupervisionContext for SignalSupervision {
    fn record_heartbeat(&self) {
        debug!("attempt heartbeat");
    }

    fn cancellation_requested(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
