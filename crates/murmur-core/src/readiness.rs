//! Waiting for the capture output file to be completely written.
//!
//! A file counts as ready when it exists and its size is strictly greater
//! than zero; a single size sample is enough. That is a latency trade, not a
//! flush guarantee; the transcription stage treats a zero-length read later
//! as its own soft failure.

use std::path::Path;
use std::time::Duration;

use crate::scheduler::{Scheduler, TimerOutcome};

/// Default attempt budget for the readiness wait (10 s at 500 ms).
pub const MAX_WAIT_ATTEMPTS: u32 = 20;

/// Default interval between readiness polls.
pub const WAIT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// The file exists with a non-zero size.
    Ready,
    /// The attempt budget ran out. Callers proceed anyway: a file that
    /// exists but is still being finalized may yet be usable.
    TimedOut,
    /// Teardown cancelled the wait.
    Cancelled,
}

/// Polls the filesystem until the capture output is stable.
#[derive(Debug, Clone)]
pub struct FileReadinessWaiter {
    scheduler: Scheduler,
}

impl FileReadinessWaiter {
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }

    /// Poll `path` at a fixed interval until it has non-zero size, up to
    /// `max_attempts` polls.
    pub async fn wait_until_ready(
        &self,
        path: &Path,
        max_attempts: u32,
        interval: Duration,
    ) -> ReadinessOutcome {
        for attempt in 1..=max_attempts {
            if self.scheduler.sleep(interval).await == TimerOutcome::Cancelled {
                return ReadinessOutcome::Cancelled;
            }
            match tokio::fs::metadata(path).await {
                Ok(meta) if meta.len() > 0 => {
                    crate::verbose!(
                        "capture file ready after {attempt} poll(s): {} ({} bytes)",
                        path.display(),
                        meta.len()
                    );
                    return ReadinessOutcome::Ready;
                }
                _ => {
                    crate::verbose!(
                        "waiting for capture file, attempt {attempt}/{max_attempts}"
                    );
                }
            }
        }
        ReadinessOutcome::TimedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn missing_file_times_out_after_exactly_max_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let waiter = FileReadinessWaiter::new(Scheduler::new());
        let interval = Duration::from_millis(500);

        let started = Instant::now();
        let outcome = waiter
            .wait_until_ready(&dir.path().join("never.ogg"), 5, interval)
            .await;

        assert_eq!(outcome, ReadinessOutcome::TimedOut);
        assert_eq!(started.elapsed(), interval * 5);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_length_file_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ogg");
        std::fs::write(&path, b"").unwrap();

        let waiter = FileReadinessWaiter::new(Scheduler::new());
        let outcome = waiter
            .wait_until_ready(&path, 3, Duration::from_millis(500))
            .await;
        assert_eq!(outcome, ReadinessOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn nonempty_file_is_ready_on_first_poll() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.ogg");
        std::fs::write(&path, b"audio").unwrap();

        let waiter = FileReadinessWaiter::new(Scheduler::new());
        let started = Instant::now();
        let outcome = waiter
            .wait_until_ready(&path, 20, Duration::from_millis(500))
            .await;
        assert_eq!(outcome, ReadinessOutcome::Ready);
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn file_appearing_mid_wait_becomes_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.ogg");

        let scheduler = Scheduler::new();
        let waiter = FileReadinessWaiter::new(scheduler.clone());
        let wait_path = path.clone();
        let wait = tokio::spawn(async move {
            waiter
                .wait_until_ready(&wait_path, 20, Duration::from_millis(500))
                .await
        });

        // Let the waiter park on its first timer, then produce the file.
        while scheduler.pending_timers() == 0 {
            tokio::task::yield_now().await;
        }
        std::fs::write(&path, b"audio").unwrap();

        assert_eq!(wait.await.unwrap(), ReadinessOutcome::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_wait() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = Scheduler::new();
        let waiter = FileReadinessWaiter::new(scheduler.clone());
        let path = dir.path().join("never.ogg");

        let wait = tokio::spawn(async move {
            waiter
                .wait_until_ready(&path, 1000, Duration::from_secs(3600))
                .await
        });

        while scheduler.pending_timers() == 0 {
            tokio::task::yield_now().await;
        }
        scheduler.cancel_all();

        assert_eq!(wait.await.unwrap(), ReadinessOutcome::Cancelled);
    }
}
