// ── Cancellable periodic polling ──
//
// REST-backed slices (pairing, log buffer, time sync, statistics) are
// refreshed by small periodic tasks. Each task writes into the same
// store slices as push updates; a failed tick keeps the previous value.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;

/// Handle to one periodic polling task.
///
/// The task runs until [`stop`](Self::stop) is called or the parent
/// cancellation token fires. Dropping the handle aborts the task — a
/// forgotten poller must not outlive its owner.
pub struct PollHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollHandle {
    /// Spawn a poller that runs `tick` immediately and then once per
    /// `period`.
    ///
    /// Tick failures are logged and swallowed: polling degradation must
    /// never propagate past the slice it feeds.
    pub fn spawn<F, Fut>(
        name: &'static str,
        period: Duration,
        parent: &CancellationToken,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), CoreError>> + Send,
    {
        let cancel = parent.child_token();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    _ = interval.tick() => {
                        if let Err(error) = tick().await {
                            warn!(task = name, %error, "poll tick failed; keeping previous value");
                        }
                    }
                }
            }
            debug!(task = name, "poller stopped");
        });

        Self { cancel, handle }
    }

    /// Stop the poller and wait for it to wind down.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_immediately_and_then_periodically() {
        let count = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let counter = Arc::clone(&count);
        let _poller = PollHandle::spawn("test", Duration::from_secs(10), &cancel, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_ticks_keep_polling() {
        let count = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let counter = Arc::clone(&count);
        let _poller = PollHandle::spawn("flaky", Duration::from_secs(5), &cancel, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CoreError::Disconnected)
            }
        });

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_the_task() {
        let count = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let counter = Arc::clone(&count);
        let poller = PollHandle::spawn("child", Duration::from_secs(5), &cancel, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        tokio::time::sleep(Duration::from_millis(1)).await;
        cancel.cancel();
        poller.stop().await;

        let after_stop = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }
}
