//! Polling for the transcription result artifact.
//!
//! The result of a transcription request lands in a file rather than being
//! awaited directly, so the poller checks that file at a fixed interval with
//! a hard attempt cap. The bounded retry here is the pipeline's only
//! recovery/backpressure mechanism: a fixed worst-case latency instead of an
//! unbounded wait on a network call of unknown duration.

use std::io::ErrorKind;
use std::path::Path;

use crate::scheduler::{Scheduler, TimerOutcome};
use crate::session::TranscriptionJob;

/// Default result-poll attempt cap (20 s at 500 ms).
pub const MAX_POLL_ATTEMPTS: u32 = 40;

/// Default interval between result polls.
pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(500);

/// Longest diagnostic excerpt surfaced to the user.
pub const DIAGNOSTIC_PREVIEW_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The result artifact held non-whitespace text (already trimmed).
    Success(String),
    /// The result artifact appeared but trimmed to nothing.
    Empty { diagnostic: Option<String> },
    /// The attempt cap ran out before a result appeared.
    TimedOut { diagnostic: Option<String> },
    /// Reading or decoding the result artifact failed; the loop stops
    /// immediately rather than retrying.
    ReadError(String),
    /// Teardown cancelled the poll.
    Cancelled,
}

/// Polls for the transcription result becoming available.
#[derive(Debug, Clone)]
pub struct ResultPoller {
    scheduler: Scheduler,
}

impl ResultPoller {
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }

    /// Poll the job's result artifact until text appears, the attempt cap is
    /// reached, or a read fails. Every terminal outcome deletes the result
    /// and audio artifacts (and any error diagnostic), tolerating deletion
    /// failures silently.
    pub async fn poll_for_result(&self, job: &TranscriptionJob) -> PollOutcome {
        let mut attempts = 0u32;
        let outcome = loop {
            if self.scheduler.sleep(job.poll_interval).await == TimerOutcome::Cancelled {
                return PollOutcome::Cancelled;
            }
            attempts += 1;
            match read_result(&job.output_path).await {
                Ok(Some(contents)) => {
                    let trimmed = contents.trim();
                    if trimmed.is_empty() {
                        break PollOutcome::Empty {
                            diagnostic: read_diagnostic(&job.error_path).await,
                        };
                    }
                    break PollOutcome::Success(trimmed.to_string());
                }
                // Missing or still zero-length; keep polling.
                Ok(None) => {
                    crate::verbose!(
                        "waiting for transcription result, attempt {attempts}/{}",
                        job.max_attempts
                    );
                }
                Err(detail) => break PollOutcome::ReadError(detail),
            }
            if attempts >= job.max_attempts {
                break PollOutcome::TimedOut {
                    diagnostic: read_diagnostic(&job.error_path).await,
                };
            }
        };
        cleanup(job).await;
        outcome
    }
}

/// Read the result artifact. `Ok(None)` means "not there yet" (missing or
/// zero-length); `Err` carries a read/decode failure.
async fn read_result(path: &Path) -> Result<Option<String>, String> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.is_empty() => Ok(None),
        Ok(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|err| format!("result file is not valid UTF-8: {err}")),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(format!("failed to read result file: {err}")),
    }
}

/// Best-effort excerpt of the error diagnostic artifact.
async fn read_diagnostic(path: &Path) -> Option<String> {
    let bytes = tokio::fs::read(path).await.ok()?;
    let text = String::from_utf8_lossy(&bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(preview(trimmed, DIAGNOSTIC_PREVIEW_MAX))
}

async fn cleanup(job: &TranscriptionJob) {
    for path in [&job.output_path, &job.audio_path, &job.error_path] {
        let _ = tokio::fs::remove_file(path).await;
    }
}

/// First `max_chars` characters of the trimmed text, with an ellipsis when
/// truncated.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let mut shortened: String = trimmed.chars().take(max_chars).collect();
        shortened.push_str("...");
        shortened
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    fn job_in(dir: &Path, max_attempts: u32) -> TranscriptionJob {
        TranscriptionJob::create(
            &dir.join("recording.ogg"),
            dir,
            max_attempts,
            Duration::from_millis(500),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn text_result_is_trimmed_success() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path(), 40);
        std::fs::write(&job.audio_path, b"audio").unwrap();
        std::fs::write(&job.output_path, "  hello world \n").unwrap();

        let poller = ResultPoller::new(Scheduler::new());
        let outcome = poller.poll_for_result(&job).await;

        assert_eq!(outcome, PollOutcome::Success("hello world".to_string()));
        assert!(!job.output_path.exists());
        assert!(!job.audio_path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn whitespace_only_result_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path(), 40);
        std::fs::write(&job.output_path, "   \n\t").unwrap();

        let poller = ResultPoller::new(Scheduler::new());
        let outcome = poller.poll_for_result(&job).await;

        assert_eq!(outcome, PollOutcome::Empty { diagnostic: None });
    }

    #[tokio::test(start_paused = true)]
    async fn empty_result_surfaces_error_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path(), 40);
        std::fs::write(&job.output_path, "\n").unwrap();
        std::fs::write(&job.error_path, "API error (401): bad key\n").unwrap();

        let poller = ResultPoller::new(Scheduler::new());
        match poller.poll_for_result(&job).await {
            PollOutcome::Empty { diagnostic } => {
                assert_eq!(diagnostic.as_deref(), Some("API error (401): bad key"));
            }
            other => panic!("expected Empty, got {other:?}"),
        }
        assert!(!job.error_path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_result_times_out_after_the_attempt_cap() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path(), 3);

        let poller = ResultPoller::new(Scheduler::new());
        let started = Instant::now();
        let outcome = poller.poll_for_result(&job).await;

        assert_eq!(outcome, PollOutcome::TimedOut { diagnostic: None });
        assert_eq!(started.elapsed(), job.poll_interval * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_length_result_keeps_polling() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path(), 2);
        std::fs::write(&job.output_path, b"").unwrap();

        let poller = ResultPoller::new(Scheduler::new());
        let outcome = poller.poll_for_result(&job).await;
        assert_eq!(outcome, PollOutcome::TimedOut { diagnostic: None });
    }

    #[tokio::test(start_paused = true)]
    async fn undecodable_result_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path(), 40);
        std::fs::write(&job.output_path, [0xff, 0xfe, 0xfd]).unwrap();

        let poller = ResultPoller::new(Scheduler::new());
        match poller.poll_for_result(&job).await {
            PollOutcome::ReadError(detail) => assert!(detail.contains("UTF-8")),
            other => panic!("expected ReadError, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn long_diagnostic_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path(), 1);
        std::fs::write(&job.error_path, "x".repeat(500)).unwrap();

        let poller = ResultPoller::new(Scheduler::new());
        match poller.poll_for_result(&job).await {
            PollOutcome::TimedOut { diagnostic } => {
                let diagnostic = diagnostic.unwrap();
                assert_eq!(diagnostic.chars().count(), DIAGNOSTIC_PREVIEW_MAX + 3);
                assert!(diagnostic.ends_with("..."));
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
    }

    #[test]
    fn preview_keeps_short_text_intact() {
        assert_eq!(preview("  hello  ", 50), "hello");
        assert_eq!(preview(&"a".repeat(60), 50).chars().count(), 53);
    }
}
