//! Session and job data model.
//!
//! A [`RecordingSession`] is one full record→transcribe lifecycle; a
//! [`TranscriptionJob`] is the transcription sub-lifecycle nested within it.
//! Both are owned exclusively by the controller: at most one of each exists
//! at any time, and a job never outlives its parent session's terminal
//! transition.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::supervisor::ProcessHandle;

static ARTIFACT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Collision-free token for artifact names: pid, wall-clock seconds, and a
/// process-wide monotonic counter.
fn unique_token() -> String {
    let seq = ARTIFACT_SEQ.fetch_add(1, Ordering::Relaxed);
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}_{secs}_{seq}", std::process::id())
}

/// One live recording lifecycle.
#[derive(Debug)]
pub struct RecordingSession {
    pub id: String,
    pub audio_path: PathBuf,
    pub process: Option<ProcessHandle>,
    pub started_at: Instant,
}

impl RecordingSession {
    /// Create a session with a fresh, collision-free audio artifact path.
    pub fn create(artifact_dir: &Path, extension: &str) -> Self {
        let id = unique_token();
        let audio_path = artifact_dir.join(format!("murmur_recording_{id}.{extension}"));
        Self {
            id,
            audio_path,
            process: None,
            started_at: Instant::now(),
        }
    }
}

/// The transcription sub-lifecycle: where the request reads from, where its
/// result and error diagnostics land, and the polling budget.
#[derive(Debug, Clone)]
pub struct TranscriptionJob {
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    pub error_path: PathBuf,
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl TranscriptionJob {
    pub fn create(
        audio_path: &Path,
        artifact_dir: &Path,
        max_attempts: u32,
        poll_interval: Duration,
    ) -> Self {
        let token = unique_token();
        Self {
            audio_path: audio_path.to_path_buf(),
            output_path: artifact_dir.join(format!("murmur_output_{token}.txt")),
            error_path: artifact_dir.join(format!("murmur_error_{token}.txt")),
            max_attempts,
            poll_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_paths_are_unique() {
        let dir = std::env::temp_dir();
        let paths: Vec<_> = (0..100)
            .map(|_| RecordingSession::create(&dir, "ogg").audio_path)
            .collect();
        let mut deduped = paths.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), paths.len());
    }

    #[test]
    fn session_path_uses_extension() {
        let session = RecordingSession::create(Path::new("/tmp"), "ogg");
        assert_eq!(session.audio_path.extension().unwrap(), "ogg");
        assert!(session.process.is_none());
    }

    #[test]
    fn job_artifacts_are_distinct() {
        let dir = std::env::temp_dir();
        let audio = dir.join("a.ogg");
        let job = TranscriptionJob::create(&audio, &dir, 40, Duration::from_millis(500));
        assert_ne!(job.output_path, job.error_path);
        assert_ne!(job.output_path, job.audio_path);

        let other = TranscriptionJob::create(&audio, &dir, 40, Duration::from_millis(500));
        assert_ne!(job.output_path, other.output_path);
    }
}
