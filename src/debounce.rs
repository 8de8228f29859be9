//! Debounced value propagation.
//!
//! A timing primitive: rapidly changing input values are suppressed until
//! one of them has been stable for a full quiescence window, at which
//! point it commits to the output. The latest value is never dropped,
//! only superseded by a newer one before it commits.

use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Debounces a stream of values with a fixed quiescence window.
///
/// Dropping the debouncer cancels any pending commit, so nothing fires
/// after the consumer has gone away.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    output: watch::Receiver<T>,
    cancel: CancellationToken,
}

impl<T: Clone + Send + Sync + 'static> Debouncer<T> {
    /// Spawn the debounce task. The output starts at `initial` and adopts
    /// each submitted value once `delay` elapses with no newer input.
    #[must_use]
    pub fn new(initial: T, delay: Duration) -> Self {
        let (input, mut input_rx) = mpsc::unbounded_channel::<T>();
        let (output_tx, output) = watch::channel(initial);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            let mut pending: Option<T> = None;
            let mut deadline: Option<Pin<Box<tokio::time::Sleep>>> = None;
            loop {
                tokio::select! {
                    // Cancellation and fresh input take priority over a
                    // timer that becomes ready in the same poll.
                    biased;
                    () = task_cancel.cancelled() => break,
                    received = input_rx.recv() => match received {
                        Some(value) => {
                            // Each new input restarts the timer.
                            pending = Some(value);
                            deadline = Some(Box::pin(tokio::time::sleep(delay)));
                        }
                        None => break,
                    },
                    () = async { deadline.as_mut().expect("branch enabled only while set").await },
                        if deadline.is_some() =>
                    {
                        if let Some(value) = pending.take() {
                            let _ = output_tx.send(value);
                        }
                        deadline = None;
                    }
                }
            }
        });

        Self {
            input,
            output,
            cancel,
        }
    }

    /// Submit a new value, restarting the quiescence timer.
    pub fn submit(&self, value: T) {
        let _ = self.input.send(value);
    }

    /// Subscribe to committed values.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.output.clone()
    }

    /// The most recently committed value.
    #[must_use]
    pub fn latest(&self) -> T {
        self.output.borrow().clone()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
