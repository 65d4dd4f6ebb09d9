//! Process supervision for the external audio-capture binary.
//!
//! The supervisor owns nothing but the spawned process handle. Termination is
//! fire-and-forget: the controller never waits for the capture process to
//! exit, because progress is gated on the output file reaching a non-zero
//! size, not on process-exit detection.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::error::SpawnError;

/// Placeholder in [`CaptureConfig`] arguments that is replaced with the
/// session's audio artifact path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Directories probed for the capture binary when it is not on PATH.
const FALLBACK_DIRS: &[&str] = &["/usr/bin", "/usr/local/bin"];

/// The external capture invocation: binary, argument template, and the
/// container extension its output uses.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub binary: String,
    pub args: Vec<String>,
    pub extension: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::ffmpeg("alsa", "libvorbis")
    }
}

impl CaptureConfig {
    /// The standard ffmpeg invocation:
    /// `ffmpeg -f <input_backend> -i default -c:a <codec> -y <output>`.
    pub fn ffmpeg(input_backend: &str, codec: &str) -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            args: vec![
                "-f".to_string(),
                input_backend.to_string(),
                "-i".to_string(),
                "default".to_string(),
                "-c:a".to_string(),
                codec.to_string(),
                "-y".to_string(),
                OUTPUT_PLACEHOLDER.to_string(),
            ],
            extension: extension_for_codec(codec).to_string(),
        }
    }

    /// Concrete command line for one session, with the output placeholder
    /// substituted.
    pub fn command_for(&self, output: &Path) -> (String, Vec<String>) {
        let output = output.to_string_lossy();
        let args = self
            .args
            .iter()
            .map(|arg| arg.replace(OUTPUT_PLACEHOLDER, &output))
            .collect();
        (self.binary.clone(), args)
    }
}

fn extension_for_codec(codec: &str) -> &'static str {
    match codec {
        "libvorbis" | "libopus" => "ogg",
        "libmp3lame" => "mp3",
        "aac" => "m4a",
        "flac" => "flac",
        _ => "ogg",
    }
}

/// Handle to a spawned capture process.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    pid: Option<u32>,
}

impl ProcessHandle {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

/// Starts and stops the external capture process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSupervisor;

impl ProcessSupervisor {
    /// Resolve a binary name to a path: absolute paths are checked directly,
    /// otherwise PATH is scanned, then the known fallback directories.
    pub fn resolve_binary(name: &str) -> Option<PathBuf> {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        if let Some(paths) = env::var_os("PATH") {
            for dir in env::split_paths(&paths) {
                let full = dir.join(name);
                if full.is_file() {
                    return Some(full);
                }
            }
        }
        FALLBACK_DIRS
            .iter()
            .map(|dir| Path::new(dir).join(name))
            .find(|path| path.is_file())
    }

    /// Spawn the capture process. The binary is re-validated as resolvable
    /// before spawning so an unresolvable binary surfaces as
    /// [`SpawnError::BinaryNotFound`] rather than a raw I/O error.
    pub fn launch(&self, program: &str, args: &[String]) -> Result<ProcessHandle, SpawnError> {
        let resolved = Self::resolve_binary(program)
            .ok_or_else(|| SpawnError::BinaryNotFound(program.to_string()))?;
        let child = Command::new(&resolved)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpawnError::Io {
                program: program.to_string(),
                source,
            })?;
        let pid = child.id();
        crate::verbose!("started capture process `{program}` (pid {pid:?})");
        Ok(ProcessHandle { child, pid })
    }

    /// Send a graceful termination signal to the process and reap it in the
    /// background. Fire-and-forget: the caller is not expected to await the
    /// returned handle (tests may). Signal-delivery failure is logged, never
    /// escalated; the output file, not process exit, gates progress.
    pub fn terminate(handle: ProcessHandle) -> JoinHandle<bool> {
        tokio::spawn(async move {
            let ProcessHandle { mut child, pid } = handle;
            let delivered = deliver_term_signal(&mut child, pid);
            if !delivered {
                crate::verbose!("capture process (pid {pid:?}) signal delivery failed; it may have already exited");
            }
            let _ = child.wait().await;
            delivered
        })
    }
}

fn deliver_term_signal(child: &mut Child, pid: Option<u32>) -> bool {
    match pid {
        Some(pid) => {
            #[cfg(unix)]
            {
                unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) == 0 }
            }
            #[cfg(not(unix))]
            {
                let _ = pid;
                child.start_kill().is_ok()
            }
        }
        None => child.start_kill().is_ok(),
    }
}
