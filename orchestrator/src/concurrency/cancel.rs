use tokio::sync::watch;

/// Sending half of the cancellation channel of an attempt.
///
/// Cancellation is edge-less state, not an event: the channel carries a `bool` so a
/// receiver that subscribes after the signal was raised still observes it. This matters
/// because a cancellation raised while the spec is being hydrated must reach the worker
/// that is only constructed afterwards.
#[derive(Debug, Clone)]
pub struct CancelTx(watch::Sender<bool>);

impl CancelTx {
    /// Requests cancellation of the attempt.
    ///
    /// Safe to call any number of times, only the first transition has an effect. A
    /// call before any worker subscribed is a no-op for the attempt outcome.
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }

    pub fn subscribe(&self) -> CancelRx {
        CancelRx(self.0.subscribe())
    }
}

/// Receiving half of the cancellation channel of an attempt.
#[derive(Debug, Clone)]
pub struct CancelRx(watch::Receiver<bool>);

impl CancelRx {
    /// Returns whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Completes once cancellation has been requested.
    ///
    /// If the sending half is dropped without a cancellation, the future never
    /// resolves, which makes it safe to use inside `select!` against the work itself.
    pub async fn cancelled(&mut self) {
        if self.0.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Creates a new pair of [`CancelTx`] and [`CancelRx`].
pub fn create_cancel_channel() -> (CancelTx, CancelRx) {
    let (tx, rx) = watch::channel(false);
    (CancelTx(tx), CancelRx(rx))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let (tx, rx) = create_cancel_channel();

        assert!(!rx.is_cancelled());

        tx.cancel();
        tx.cancel();

        assert!(rx.is_cancelled());
    }

    #[tokio::test]
    async fn late_subscriber_observes_cancellation() {
        let (tx, _rx) = create_cancel_channel();

        tx.cancel();

        let mut late = tx.subscribe();
        assert!(late.is_cancelled());

        // Must resolve immediately even though the signal was raised before subscribing.
        tokio::time::timeout(Duration::from_secs(1), late.cancelled())
            .await
            .expect("cancelled() should resolve for a late subscriber");
    }

    #[tokio::test]
    async fn cancelled_never_resolves_without_a_signal() {
        let (tx, mut rx) = create_cancel_channel();
        drop(tx);

        let result = tokio::time::timeout(Duration::from_millis(50), rx.cancelled()).await;

        assert!(result.is_err());
    }
}
