//! Cancellable delay used for every monitor's timeout window.
use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// How a countdown's wait resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    /// The full duration passed without a cancellation signal.
    Elapsed,
    /// The owning handle cancelled (or dropped) the countdown first.
    Cancelled,
}

/// Waits for `duration` unless `cancel_rx` fires first. A dropped sender counts
/// as a cancellation.
pub async fn wait(duration: Duration, mut cancel_rx: oneshot::Receiver<()>) -> CountdownOutcome {
    tokio::select! {
        biased;

        _ = &mut cancel_rx => CountdownOutcome::Cancelled,
        _ = tokio::time::sleep(duration) => CountdownOutcome::Elapsed,
    }
}

/// Handle to a running countdown task.
///
/// Dropping the handle cancels the countdown. Cancelling is idempotent and
/// never fails, including after the countdown has already elapsed.
#[derive(Debug)]
pub struct Countdown {
    generation: u64,
    cancel_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Spawns a countdown task. `on_elapsed` runs on that task only if the wait
    /// ends with [`CountdownOutcome::Elapsed`].
    pub fn start<F, Fut>(label: String, generation: u64, duration: Duration, on_elapsed: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            match wait(duration, cancel_rx).await {
                CountdownOutcome::Elapsed => on_elapsed().await,
                CountdownOutcome::Cancelled => {
                    debug!(device_id = %label, generation, "Countdown cancelled.");
                }
            }
        });
        Self {
            generation,
            cancel_tx: Some(cancel_tx),
            handle,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            // The receiver is gone once the task has finished; nothing to stop then.
            let _ = tx.send(());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_tx.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_countdown(generation: u64, secs: u64, fired: &Arc<AtomicUsize>) -> Countdown {
        let fired = fired.clone();
        Countdown::start("test-device".to_string(), generation, Duration::from_secs(secs), move || async move {
            fired.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_elapses_without_signal() {
        let (_tx, rx) = oneshot::channel::<()>();
        let outcome = wait(Duration::from_secs(5), rx).await;
        assert_eq!(outcome, CountdownOutcome::Elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_reports_cancellation() {
        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();
        assert_eq!(wait(Duration::from_secs(5), rx).await, CountdownOutcome::Cancelled);

        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);
        assert_eq!(wait(Duration::from_secs(5), rx).await, CountdownOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_countdown_runs_callback_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let countdown = counting_countdown(1, 2, &fired);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(countdown.is_finished());
        assert_eq!(countdown.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_countdown_never_runs_callback() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut countdown = counting_countdown(7, 2, &fired);

        tokio::time::sleep(Duration::from_secs(1)).await;
        countdown.cancel();
        countdown.cancel();
        assert!(countdown.is_cancelled());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(countdown.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_and_cancel_after_elapse_is_noop() {
        let fired = Arc::new(AtomicUsize::new(0));
        drop(counting_countdown(1, 2, &fired));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        let mut countdown = counting_countdown(2, 1, &fired);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        countdown.cancel();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
