//! Continuation timer for the step engine.
//!
//! A run only makes progress while something keeps invoking the step
//! function, so the engine arms a recurring timer after `start` and
//! disarms it when the run reaches a terminal state. Exactly one timer
//! slot exists; re-arming replaces the previous timer instead of
//! stacking a second one.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// How long `shutdown` waits for the timer task to exit cleanly.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Single-slot recurring timer.
pub struct StepScheduler {
    slot: Mutex<Option<ArmedTimer>>,
    /// Master token, cancelled once at process shutdown.
    cancel: CancellationToken,
}

struct ArmedTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl StepScheduler {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    /// Arm the timer: run `tick` every `interval` until the timer is
    /// removed or `tick` resolves to `false`.
    ///
    /// Safe to call repeatedly; any previously armed timer is cancelled
    /// first, so tick invocations never stack.
    pub async fn install<F, Fut>(&self, interval: Duration, tick: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let timer_cancel = self.cancel.child_token();
        let cancel = timer_cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick fires immediately; consume it so the
            // first scheduled run lands one full interval after arming.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("Continuation timer cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !tick().await {
                            tracing::debug!("Continuation timer finished");
                            break;
                        }
                    }
                }
            }
        });

        let mut slot = self.slot.lock().await;
        if let Some(previous) = slot.replace(ArmedTimer {
            cancel: timer_cancel,
            handle,
        }) {
            previous.cancel.cancel();
        }
    }

    /// Disarm the timer if one is armed.
    ///
    /// Does not wait for an in-flight tick; the cancelled task exits once
    /// its current tick finishes. Callable from inside a tick.
    pub async fn remove(&self) {
        let armed = self.slot.lock().await.take();
        if let Some(armed) = armed {
            armed.cancel.cancel();
        }
    }

    /// Whether a timer is armed and its task still alive.
    pub async fn is_armed(&self) -> bool {
        self.slot
            .lock()
            .await
            .as_ref()
            .is_some_and(|armed| !armed.handle.is_finished())
    }

    /// Cancel everything and wait briefly for the timer task to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let armed = self.slot.lock().await.take();
        if let Some(armed) = armed {
            armed.cancel.cancel();
            let _ = tokio::time::timeout(DRAIN_TIMEOUT, armed.handle).await;
        }
    }
}

impl Default for StepScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn timer_waits_a_full_interval_before_first_run() {
        let scheduler = StepScheduler::new();
        let count = Arc::new(AtomicU32::new(0));

        let c = Arc::clone(&count);
        scheduler
            .install(Duration::from_millis(80), move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    true
                }
            })
            .await;

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(count.load(Ordering::SeqCst) >= 1);

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn install_replaces_the_previous_timer() {
        let scheduler = StepScheduler::new();
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));

        let c = Arc::clone(&first);
        scheduler
            .install(Duration::from_millis(10), move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    true
                }
            })
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(first.load(Ordering::SeqCst) >= 1);

        let c = Arc::clone(&second);
        scheduler
            .install(Duration::from_millis(10), move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    true
                }
            })
            .await;

        // Let the replaced task observe its cancellation, then check that
        // only the new timer keeps counting.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let stopped_at = first.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(first.load(Ordering::SeqCst), stopped_at);
        assert!(second.load(Ordering::SeqCst) >= 1);

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn remove_stops_ticking() {
        let scheduler = StepScheduler::new();
        let count = Arc::new(AtomicU32::new(0));

        let c = Arc::clone(&count);
        scheduler
            .install(Duration::from_millis(10), move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    true
                }
            })
            .await;

        tokio::time::sleep(Duration::from_millis(45)).await;
        scheduler.remove().await;
        assert!(!scheduler.is_armed().await);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let stopped_at = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), stopped_at);
    }

    #[tokio::test]
    async fn tick_returning_false_ends_the_timer() {
        let scheduler = StepScheduler::new();
        let count = Arc::new(AtomicU32::new(0));

        let c = Arc::clone(&count);
        scheduler
            .install(Duration::from_millis(10), move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    false
                }
            })
            .await;

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_armed().await);
    }

    #[tokio::test]
    async fn remove_without_timer_is_a_no_op() {
        let scheduler = StepScheduler::new();
        scheduler.remove().await;
        assert!(!scheduler.is_armed().await);
    }
}
