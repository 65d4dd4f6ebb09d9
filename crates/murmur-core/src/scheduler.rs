//! Cancellable timer registry.
//!
//! Every wait in the recording pipeline (capture-file readiness, result
//! polling) goes through [`Scheduler::sleep`] instead of a bare
//! `tokio::time::sleep`. Each sleep registers itself in a shared registry, so
//! a teardown can cancel every outstanding timer deterministically with
//! [`Scheduler::cancel_all`]. A cancelled sleeper observes
//! [`TimerOutcome::Cancelled`] and is expected to unwind without touching any
//! state that teardown may have discarded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

/// How a scheduled sleep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// The full duration elapsed.
    Elapsed,
    /// The timer was cancelled via [`Scheduler::cancel_all`].
    Cancelled,
}

/// Shared registry of in-flight timers.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

#[derive(Debug, Default)]
struct SchedulerInner {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, oneshot::Sender<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `duration`, or until [`Scheduler::cancel_all`] fires.
    pub async fn sleep(&self, duration: Duration) -> TimerOutcome {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .pending
            .lock()
            .unwrap()
            .insert(id, cancel_tx);

        let outcome = tokio::select! {
            _ = tokio::time::sleep(duration) => TimerOutcome::Elapsed,
            _ = cancel_rx => TimerOutcome::Cancelled,
        };

        self.inner.pending.lock().unwrap().remove(&id);
        outcome
    }

    /// Cancel every timer currently registered.
    ///
    /// Timers scheduled after this call run normally; cancellation is an
    /// event, not a permanent state.
    pub fn cancel_all(&self) {
        let drained: Vec<oneshot::Sender<()>> = {
            let mut pending = self.inner.pending.lock().unwrap();
            pending.drain().map(|(_, tx)| tx).collect()
        };
        for tx in drained {
            let _ = tx.send(());
        }
    }

    /// Number of timers currently waiting.
    pub fn pending_timers(&self) -> usize {
        self.inner.pending.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleep_elapses() {
        let scheduler = Scheduler::new();
        let outcome = scheduler.sleep(Duration::from_millis(500)).await;
        assert_eq!(outcome, TimerOutcome::Elapsed);
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_wakes_every_sleeper() {
        let scheduler = Scheduler::new();
        let mut handles = Vec::new();
        for _ in 0..3 {
            let scheduler = scheduler.clone();
            handles.push(tokio::spawn(async move {
                scheduler.sleep(Duration::from_secs(3600)).await
            }));
        }

        // Let the sleepers register without advancing the paused clock.
        while scheduler.pending_timers() < 3 {
            tokio::task::yield_now().await;
        }

        scheduler.cancel_all();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), TimerOutcome::Cancelled);
        }
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_after_cancel_all_runs_normally() {
        let scheduler = Scheduler::new();
        scheduler.cancel_all();
        let outcome = scheduler.sleep(Duration::from_millis(100)).await;
        assert_eq!(outcome, TimerOutcome::Elapsed);
    }
}
