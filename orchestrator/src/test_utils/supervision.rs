use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::concurrency::heartbeat::SupervisionContext;

/// Supervision context fake driven by hand from tests.
#[derive(Debug, Clone, Default)]
pub struct ManualSupervision {
    heartbeats: Arc<AtomicUsize>,
    cancel_requested: Arc<AtomicBool>,
}

impl ManualSupervision {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of heartbeats recorded so far.
    pub fn heartbeats(&self) -> usize {
        self.heartbeats.load(Ordering::SeqCst)
    }

    /// Flags the attempt as cancelled by the external caller.
    pub fn request_cancellation(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }
}

impl SupervisionContext for ManualSupervision {
    fn record_heartbeat(&self) {
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
    }

    fn cancellation_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }
}
