//! Startup checks shared by the CLI commands.

use std::path::Path;

use murmur_core::ProcessSupervisor;

/// Result of the one-time dependency probe. The controller treats the
/// boolean as immutable input for the session.
#[derive(Debug, Default)]
pub struct DependencyReport {
    pub missing: Vec<String>,
}

impl DependencyReport {
    pub fn available(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check, once at startup, that the capture binary is resolvable and the
/// artifact directory is writable.
pub fn probe_dependencies(capture_binary: &str, artifact_dir: &Path) -> DependencyReport {
    let mut missing = Vec::new();

    if ProcessSupervisor::resolve_binary(capture_binary).is_none() {
        missing.push(capture_binary.to_string());
    }

    if !artifact_dir_writable(artifact_dir) {
        missing.push(format!("writable {}", artifact_dir.display()));
    }

    DependencyReport { missing }
}

fn artifact_dir_writable(dir: &Path) -> bool {
    let probe = dir.join(format!("murmur_probe_{}", std::process::id()));
    match std::fs::write(&probe, b"probe") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

pub fn report_missing(report: &DependencyReport) {
    eprintln!(
        "Missing required dependencies: {}",
        report.missing.join(", ")
    );
    eprintln!("Recording is disabled until they are available.");
}
