pub mod clipboard;
pub mod controller;
pub mod credential;
pub mod error;
pub mod poller;
pub mod readiness;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod supervisor;
pub mod transcription;
pub mod verbose;

pub use clipboard::{ClipboardSink, SystemClipboard, copy_to_clipboard};
pub use controller::{
    ControllerConfig, ControllerEvent, LifecycleState, NOTIFY_PREVIEW_MAX, RecordingController,
};
pub use credential::{CredentialStore, REDACTION_MARKER, SettingsCredentials, redact};
pub use error::{SpawnError, SubmitError};
pub use poller::{DIAGNOSTIC_PREVIEW_MAX, PollOutcome, ResultPoller};
pub use readiness::{FileReadinessWaiter, ReadinessOutcome};
pub use scheduler::{Scheduler, TimerOutcome};
pub use session::{RecordingSession, TranscriptionJob};
pub use settings::{DEFAULT_TOGGLE_SHORTCUT, Settings};
pub use supervisor::{CaptureConfig, OUTPUT_PLACEHOLDER, ProcessHandle, ProcessSupervisor};
pub use transcription::{
    DEFAULT_API_URL, DEFAULT_MODEL, OpenAiBackend, SubmissionHandle, TranscriptionBackend,
};
pub use verbose::set_verbose;
