use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::concurrency::cancel::CancelTx;

/// Bridge to the caller's supervision primitives.
///
/// The workflow layer that invokes an attempt supplies liveness and cancellation
/// signaling through this trait; the orchestrator never talks to a workflow engine
/// directly. Implementations must be cheap to call, both methods are invoked on every
/// heartbeat tick.
pub trait SupervisionContext: Send + Sync + 'static {
    /// Signals the caller that the attempt is still alive.
    fn record_heartbeat(&self);

    /// Returns whether the caller has requested cancellation of the attempt.
    fn cancellation_requested(&self) -> bool;
}

/// Background task that keeps the supervision context aware of a running attempt.
///
/// On every tick it records a heartbeat and checks for an externally requested
/// cancellation, forwarding the first one into the attempt's cancellation channel.
/// Dropping the bridge aborts the task so early error returns cannot leak it.
#[derive(Debug)]
pub struct HeartbeatBridge {
    handle: Option<JoinHandle<()>>,
    stop_tx: watch::Sender<()>,
}

impl HeartbeatBridge {
    /// Starts the bridge with the given heartbeat interval.
    ///
    /// The first heartbeat is recorded immediately, before any attempt work runs.
    pub fn start<C>(context: C, cancel_tx: CancelTx, interval: Duration) -> Self
    where
        C: SupervisionContext,
    {
        let (stop_tx, mut stop_rx) = watch::channel(());

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut cancel_forwarded = false;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        context.record_heartbeat();

                        if !cancel_forwarded && context.cancellation_requested() {
                            info!("external cancellation detected, forwarding to the running worker");

                            cancel_tx.cancel();
                            cancel_forwarded = true;
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }
        });

        Self {
            handle: Some(handle),
            stop_tx,
        }
    }

    /// Stops the bridge and waits for its task to finish.
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(());

        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for HeartbeatBridge {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::concurrency::cancel::create_cancel_channel;
    use crate::test_utils::ManualSupervision;

    #[tokio::test]
    async fn records_heartbeats_while_running() {
        let context = ManualSupervision::new();
        let (cancel_tx, _cancel_rx) = create_cancel_channel();

        let bridge = HeartbeatBridge::start(context.clone(), cancel_tx, Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(50)).await;
        bridge.stop().await;

        assert!(context.heartbeats() > 0);
    }

    #[tokio::test]
    async fn forwards_external_cancellation_into_the_channel() {
        let context = ManualSupervision::new();
        let (cancel_tx, mut cancel_rx) = create_cancel_channel();

        let bridge = HeartbeatBridge::start(context.clone(), cancel_tx, Duration::from_millis(5));

        context.request_cancellation();

        tokio::time::timeout(Duration::from_secs(1), cancel_rx.cancelled())
            .await
            .expect("cancellation should be forwarded by the bridge");

        bridge.stop().await;
    }

    #[tokio::test]
    async fn dropping_the_bridge_stops_the_task() {
        let context = ManualSupervision::new();
        let (cancel_tx, _cancel_rx) = create_cancel_channel();

        let bridge = HeartbeatBridge::start(context.clone(), cancel_tx, Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(bridge);

        // Let any in-flight tick drain before sampling the counter.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let recorded = context.heartbeats();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(context.heartbeats(), recorded);
    }
}
