//! Transcription submission.
//!
//! A backend launches the remote transcription call as a fire-and-forget
//! task whose result lands in the job's artifact files rather than being
//! awaited directly; the [`crate::poller::ResultPoller`] picks it up from
//! there. The trait is the seam tests use to substitute canned results.

mod openai;

pub use openai::{DEFAULT_API_URL, DEFAULT_MODEL, OpenAiBackend};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::error::SubmitError;
use crate::session::TranscriptionJob;

/// Handle to an in-flight submission. The pipeline drops it (the result
/// arrives via the job's artifacts); tests may await it.
#[derive(Debug)]
pub struct SubmissionHandle {
    task: JoinHandle<()>,
}

impl SubmissionHandle {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Wait for the underlying request task to finish.
    pub async fn finished(self) {
        let _ = self.task.await;
    }
}

/// A remote transcription service.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Launch the transcription call for `job`.
    ///
    /// Must fail with [`SubmitError::MissingCredential`] before any network
    /// traffic when the credential is empty, and must never let the
    /// credential value reach the job's diagnostic artifact.
    async fn submit(
        &self,
        job: &TranscriptionJob,
        credential: &str,
    ) -> Result<SubmissionHandle, SubmitError>;
}
