//! OpenAI Whisper API backend.
//!
//! Multipart form upload with `file`, `model`, and `response_format=text`
//! fields, authorized via `Bearer` token. With the text response format the
//! body is the transcript itself, which is written verbatim to the job's
//! result artifact; failures are written to the error artifact with the
//! credential redacted.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use super::{SubmissionHandle, TranscriptionBackend};
use crate::credential::redact;
use crate::error::SubmitError;
use crate::session::TranscriptionJob;

/// The OpenAI transcriptions endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Default model name.
pub const DEFAULT_MODEL: &str = "whisper-1";

/// Upper bound on the HTTP request itself. Slightly above the poller's
/// budget so the poller, not the transport, decides the timeout outcome.
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct OpenAiBackend {
    api_url: String,
    model: String,
}

impl Default for OpenAiBackend {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl OpenAiBackend {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: model.into(),
        }
    }

    /// Point the backend at a different OpenAI-compatible endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[async_trait]
impl TranscriptionBackend for OpenAiBackend {
    async fn submit(
        &self,
        job: &TranscriptionJob,
        credential: &str,
    ) -> Result<SubmissionHandle, SubmitError> {
        if credential.trim().is_empty() {
            return Err(SubmitError::MissingCredential);
        }

        let audio = tokio::fs::read(&job.audio_path).await.map_err(|err| {
            SubmitError::Launch(format!(
                "failed to read {}: {err}",
                job.audio_path.display()
            ))
        })?;
        let file_name = job
            .audio_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording".to_string());
        let mime_type = mime_for_path(&job.audio_path);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| SubmitError::Launch(format!("failed to create HTTP client: {err}")))?;

        let request = Request {
            client,
            api_url: self.api_url.clone(),
            model: self.model.clone(),
            credential: credential.to_string(),
            audio,
            file_name,
            mime_type,
            output_path: job.output_path.clone(),
            error_path: job.error_path.clone(),
        };
        Ok(SubmissionHandle::new(tokio::spawn(request.run())))
    }
}

struct Request {
    client: reqwest::Client,
    api_url: String,
    model: String,
    credential: String,
    audio: Vec<u8>,
    file_name: String,
    mime_type: &'static str,
    output_path: PathBuf,
    error_path: PathBuf,
}

impl Request {
    async fn run(self) {
        crate::verbose!("submitting {} bytes to {}", self.audio.len(), self.api_url);
        match self.send().await {
            Ok(text) => {
                if let Err(err) = tokio::fs::write(&self.output_path, text).await {
                    crate::warn!(
                        "failed to write result artifact {}: {err}",
                        self.output_path.display()
                    );
                }
            }
            Err(detail) => {
                let detail = redact(&detail, &self.credential);
                crate::verbose!("transcription request failed: {detail}");
                if let Err(err) = tokio::fs::write(&self.error_path, detail).await {
                    crate::warn!(
                        "failed to write error artifact {}: {err}",
                        self.error_path.display()
                    );
                }
            }
        }
    }

    async fn send(&self) -> Result<String, String> {
        let part = reqwest::multipart::Part::bytes(self.audio.clone())
            .file_name(self.file_name.clone())
            .mime_str(self.mime_type)
            .map_err(|err| format!("invalid mime type: {err}"))?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "text")
            .part("file", part);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.credential))
            .multipart(form)
            .send()
            .await
            .map_err(|err| format!("failed to send request: {err}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        if !status.is_success() {
            return Err(format!("API error ({status}): {body}"));
        }
        Ok(body)
    }
}

fn mime_for_path(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("ogg") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn job_in(dir: &Path) -> TranscriptionJob {
        TranscriptionJob::create(
            &dir.join("recording.ogg"),
            dir,
            40,
            Duration::from_millis(500),
        )
    }

    #[tokio::test]
    async fn empty_credential_fails_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path());
        // No audio file exists; a credential check after I/O would surface
        // Launch instead.
        let backend = OpenAiBackend::default();
        let err = backend.submit(&job, "   ").await.err().unwrap();
        assert!(matches!(err, SubmitError::MissingCredential));
    }

    #[tokio::test]
    async fn unreadable_audio_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path());
        let backend = OpenAiBackend::default();
        let err = backend.submit(&job, "sk-test").await.err().unwrap();
        assert!(matches!(err, SubmitError::Launch(_)));
    }

    #[tokio::test]
    async fn failed_request_writes_redacted_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path());
        std::fs::write(&job.audio_path, b"audio").unwrap();

        // An unroutable endpoint makes the request fail without a network
        // round trip actually completing.
        let backend = OpenAiBackend::default().with_api_url("http://127.0.0.1:1/v1/audio/transcriptions");
        let handle = backend.submit(&job, "sk-secret-key").await.unwrap();
        handle.finished().await;

        let diagnostic = std::fs::read_to_string(&job.error_path).unwrap();
        assert!(!diagnostic.contains("sk-secret-key"));
        assert!(!job.output_path.exists());
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for_path(Path::new("a.ogg")), "audio/ogg");
        assert_eq!(mime_for_path(Path::new("a.bin")), "application/octet-stream");
    }
}
