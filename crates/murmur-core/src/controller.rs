//! The recording/transcription lifecycle controller.
//!
//! A finite-state machine driving capture, file readiness, transcription
//! submission, and result polling in sequence:
//!
//! ```text
//! Idle -> Recording -> Stopping -> WaitingForFile -> Transcribing -> Polling -> Idle
//! ```
//!
//! `Idle` is also the error-recovery terminal: every failure notifies once
//! and returns here. Exactly one session (and at most one transcription job)
//! is in flight at a time; the controller itself is the mutual-exclusion
//! boundary, so a `start()` while active is rejected at the state machine,
//! not with locks. The collaborator layer (tray icon, menu, CLI) drives the
//! controller through `toggle`/`start`/`stop`/`shutdown` and renders the
//! event stream.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::clipboard::ClipboardSink;
use crate::credential::CredentialStore;
use crate::error::SubmitError;
use crate::poller::{DIAGNOSTIC_PREVIEW_MAX, PollOutcome, ResultPoller, preview};
use crate::readiness::{FileReadinessWaiter, ReadinessOutcome};
use crate::scheduler::Scheduler;
use crate::session::{RecordingSession, TranscriptionJob};
use crate::supervisor::{CaptureConfig, ProcessSupervisor};
use crate::transcription::TranscriptionBackend;
use crate::{poller, readiness};

/// Longest transcript excerpt quoted in the success notification.
pub const NOTIFY_PREVIEW_MAX: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Recording,
    Stopping,
    WaitingForFile,
    Transcribing,
    Polling,
}

/// Events the collaborator layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    StateChanged(LifecycleState),
    /// A single user-facing message describing an outcome or failure.
    Notify(String),
    /// The user should be pointed at the settings surface (missing key).
    SettingsRequested,
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub capture: CaptureConfig,
    /// Computed once at startup by the collaborator; immutable for the
    /// session.
    pub deps_available: bool,
    /// Where audio/result/error artifacts live.
    pub artifact_dir: PathBuf,
    pub file_wait_attempts: u32,
    pub file_wait_interval: Duration,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            deps_available: true,
            artifact_dir: std::env::temp_dir(),
            file_wait_attempts: readiness::MAX_WAIT_ATTEMPTS,
            file_wait_interval: readiness::WAIT_INTERVAL,
            poll_attempts: poller::MAX_POLL_ATTEMPTS,
            poll_interval: poller::POLL_INTERVAL,
        }
    }
}

#[derive(Clone)]
pub struct RecordingController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    scheduler: Scheduler,
    supervisor: ProcessSupervisor,
    waiter: FileReadinessWaiter,
    poller: ResultPoller,
    backend: Arc<dyn TranscriptionBackend>,
    clipboard: Arc<dyn ClipboardSink>,
    credentials: Arc<dyn CredentialStore>,
    events: mpsc::UnboundedSender<ControllerEvent>,
    state: Mutex<ControllerState>,
}

struct ControllerState {
    lifecycle: LifecycleState,
    session: Option<RecordingSession>,
    job: Option<TranscriptionJob>,
    /// Bumped on teardown so a pipeline task that wakes afterwards detects
    /// it is stale and no-ops instead of touching discarded state.
    epoch: u64,
}

impl RecordingController {
    pub fn new(
        config: ControllerConfig,
        backend: Arc<dyn TranscriptionBackend>,
        clipboard: Arc<dyn ClipboardSink>,
        credentials: Arc<dyn CredentialStore>,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new();
        let inner = ControllerInner {
            waiter: FileReadinessWaiter::new(scheduler.clone()),
            poller: ResultPoller::new(scheduler.clone()),
            config,
            scheduler,
            supervisor: ProcessSupervisor,
            backend,
            clipboard,
            credentials,
            events,
            state: Mutex::new(ControllerState {
                lifecycle: LifecycleState::Idle,
                session: None,
                job: None,
                epoch: 0,
            }),
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            events_rx,
        )
    }

    /// Current lifecycle state, for UI rendering.
    pub fn state(&self) -> LifecycleState {
        self.inner.state.lock().unwrap().lifecycle
    }

    /// `start()` from `Idle`, `stop()` from anywhere else.
    pub fn toggle(&self) {
        if self.state() == LifecycleState::Idle {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Begin a new recording session. A no-op unless `Idle`.
    pub fn start(&self) {
        let inner = &self.inner;
        let mut st = inner.state.lock().unwrap();
        if st.lifecycle != LifecycleState::Idle {
            return;
        }

        if !inner.config.deps_available {
            inner.notify("Missing dependencies. Check the debug log for details.");
            return;
        }

        let credential = inner.credentials.credential().unwrap_or_default();
        if credential.trim().is_empty() {
            inner.notify("Set your OpenAI API key in the settings to start recording.");
            inner.emit(ControllerEvent::SettingsRequested);
            return;
        }

        let mut session =
            RecordingSession::create(&inner.config.artifact_dir, &inner.config.capture.extension);
        let (program, args) = inner.config.capture.command_for(&session.audio_path);
        match inner.supervisor.launch(&program, &args) {
            Ok(handle) => {
                session.process = Some(handle);
                st.lifecycle = LifecycleState::Recording;
                st.session = Some(session);
                drop(st);
                inner.emit(ControllerEvent::StateChanged(LifecycleState::Recording));
            }
            Err(err) => {
                drop(st);
                inner.notify(format!("Error starting recording: {err}"));
            }
        }
    }

    /// Stop the active recording and hand off to the transcription pipeline.
    /// A no-op unless `Recording`.
    pub fn stop(&self) {
        let inner = &self.inner;
        let (handle, audio_path, epoch) = {
            let mut st = inner.state.lock().unwrap();
            if st.lifecycle != LifecycleState::Recording {
                return;
            }
            let Some(session) = st.session.as_mut() else {
                st.lifecycle = LifecycleState::Idle;
                return;
            };
            let process = session.process.take();
            let audio_path = session.audio_path.clone();
            st.lifecycle = LifecycleState::Stopping;
            (process, audio_path, st.epoch)
        };
        inner.emit(ControllerEvent::StateChanged(LifecycleState::Stopping));

        // Best-effort, fire-and-forget: the readiness wait, not process
        // exit, gates progress from here on.
        match handle {
            Some(handle) => {
                let _ = ProcessSupervisor::terminate(handle);
            }
            None => crate::verbose!("no capture process handle to terminate"),
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            run_pipeline(inner, epoch, audio_path).await;
        });
    }

    /// Forced teardown for host shutdown: terminate any capture process,
    /// cancel every outstanding timer, and discard in-flight session and job
    /// state unconditionally.
    pub fn shutdown(&self) {
        let inner = &self.inner;
        let (handle, audio_path, job, was_active) = {
            let mut st = inner.state.lock().unwrap();
            st.epoch += 1;
            let handle = st.session.as_mut().and_then(|s| s.process.take());
            let audio_path = st.session.take().map(|s| s.audio_path);
            let job = st.job.take();
            let was_active = st.lifecycle != LifecycleState::Idle;
            st.lifecycle = LifecycleState::Idle;
            (handle, audio_path, job, was_active)
        };

        if let Some(handle) = handle {
            let _ = ProcessSupervisor::terminate(handle);
        }
        inner.scheduler.cancel_all();

        if let Some(path) = audio_path {
            let _ = std::fs::remove_file(path);
        }
        if let Some(job) = job {
            let _ = std::fs::remove_file(&job.output_path);
            let _ = std::fs::remove_file(&job.error_path);
        }

        if was_active {
            inner.emit(ControllerEvent::StateChanged(LifecycleState::Idle));
        }
    }
}

impl ControllerInner {
    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }

    fn notify(&self, message: impl Into<String>) {
        self.emit(ControllerEvent::Notify(message.into()));
    }
}

/// Everything after `stop()`: wait for the capture file, submit, poll,
/// deliver, return to `Idle`. Runs as a spawned task so `stop()` never
/// blocks its caller; `epoch` guards every state mutation against teardown.
async fn run_pipeline(inner: Arc<ControllerInner>, epoch: u64, audio_path: PathBuf) {
    if !advance(&inner, epoch, LifecycleState::WaitingForFile) {
        return;
    }
    match inner
        .waiter
        .wait_until_ready(
            &audio_path,
            inner.config.file_wait_attempts,
            inner.config.file_wait_interval,
        )
        .await
    {
        ReadinessOutcome::Cancelled => return,
        ReadinessOutcome::TimedOut => {
            // Proceed anyway: a capture file that exists but is still being
            // finalized may yet transcribe.
            crate::verbose!(
                "capture file {} never reported a non-zero size; transcribing anyway",
                audio_path.display()
            );
        }
        ReadinessOutcome::Ready => {}
    }

    if !advance(&inner, epoch, LifecycleState::Transcribing) {
        return;
    }
    let job = TranscriptionJob::create(
        &audio_path,
        &inner.config.artifact_dir,
        inner.config.poll_attempts,
        inner.config.poll_interval,
    );
    {
        let mut st = inner.state.lock().unwrap();
        if st.epoch != epoch {
            return;
        }
        st.job = Some(job.clone());
    }

    let credential = inner.credentials.credential().unwrap_or_default();
    if let Err(err) = inner.backend.submit(&job, &credential).await {
        let _ = tokio::fs::remove_file(&audio_path).await;
        let message = match &err {
            SubmitError::MissingCredential => {
                inner.emit(ControllerEvent::SettingsRequested);
                "API key not set. Please configure it in the settings.".to_string()
            }
            SubmitError::Launch(detail) => format!(
                "Error launching transcription: {}",
                preview(detail, DIAGNOSTIC_PREVIEW_MAX)
            ),
        };
        finish(&inner, epoch, message, None);
        return;
    }

    if !advance(&inner, epoch, LifecycleState::Polling) {
        return;
    }
    let (message, detail) = match inner.poller.poll_for_result(&job).await {
        PollOutcome::Success(text) => match inner.clipboard.set_text(&text) {
            Ok(()) => (
                format!(
                    "Transcription copied to clipboard: \"{}\"",
                    preview(&text, NOTIFY_PREVIEW_MAX)
                ),
                None,
            ),
            Err(err) => (
                format!("Transcription finished but clipboard copy failed: {err}"),
                None,
            ),
        },
        PollOutcome::Empty { diagnostic } => {
            ("Transcription returned empty result".to_string(), diagnostic)
        }
        PollOutcome::TimedOut { diagnostic } => {
            ("Transcription timed out".to_string(), diagnostic)
        }
        PollOutcome::ReadError(detail) => (
            format!(
                "Error checking results: {}",
                preview(&detail, DIAGNOSTIC_PREVIEW_MAX)
            ),
            None,
        ),
        PollOutcome::Cancelled => return,
    };
    finish(&inner, epoch, message, detail);
}

/// Move to `next` unless teardown invalidated this pipeline run.
fn advance(inner: &Arc<ControllerInner>, epoch: u64, next: LifecycleState) -> bool {
    {
        let mut st = inner.state.lock().unwrap();
        if st.epoch != epoch {
            return false;
        }
        st.lifecycle = next;
    }
    inner.emit(ControllerEvent::StateChanged(next));
    true
}

/// Terminal transition: notify and return to `Idle`, destroying the session
/// and job.
fn finish(inner: &Arc<ControllerInner>, epoch: u64, message: String, detail: Option<String>) {
    {
        let mut st = inner.state.lock().unwrap();
        if st.epoch != epoch {
            return;
        }
        st.lifecycle = LifecycleState::Idle;
        st.session = None;
        st.job = None;
    }
    inner.notify(message);
    if let Some(detail) = detail {
        inner.notify(format!("Error details: {detail}"));
    }
    inner.emit(ControllerEvent::StateChanged(LifecycleState::Idle));
}
