//! Error taxonomy for the recording pipeline.
//!
//! Only conditions that abort a stage are modelled as errors. Recoverable
//! conditions (a readiness timeout, an empty transcript, a poll timeout) are
//! outcome-enum variants on the component that produced them, because the
//! controller keeps going after each of them.

use thiserror::Error;

/// Failure to start the external capture process.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The capture binary could not be resolved on PATH or in the known
    /// fallback locations.
    #[error("capture binary `{0}` not found on PATH or in /usr/bin, /usr/local/bin")]
    BinaryNotFound(String),

    /// The binary was found but the spawn itself failed.
    #[error("failed to start `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to launch the transcription request.
///
/// Both variants are detected before any network traffic happens.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The credential was absent or empty at the moment of use.
    #[error("no API key configured")]
    MissingCredential,

    /// The request could not be started (unreadable audio artifact, client
    /// construction failure).
    #[error("failed to launch transcription request: {0}")]
    Launch(String),
}
