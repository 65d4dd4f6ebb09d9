//! Clipboard output.
//!
//! The controller talks to a [`ClipboardSink`] so tests can observe the
//! copied text; [`SystemClipboard`] is the real implementation.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Where transcripts end up.
pub trait ClipboardSink: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;
}

fn is_flatpak() -> bool {
    Path::new("/.flatpak-info").exists()
}

/// Inside a Flatpak sandbox GNOME/Mutter lacks the wlr-data-control Wayland
/// protocol that arboard's wayland support needs, so pipe through wl-copy.
fn copy_via_wl_copy(text: &str) -> Result<()> {
    let mut child = Command::new("wl-copy")
        .stdin(Stdio::piped())
        .spawn()
        .context("failed to spawn wl-copy")?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .context("failed to write to wl-copy")?;
    }

    let status = child.wait().context("failed to wait for wl-copy")?;
    if !status.success() {
        anyhow::bail!("wl-copy exited with non-zero status");
    }
    Ok(())
}

/// Copy `text` to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    if is_flatpak() {
        return copy_via_wl_copy(text);
    }

    let mut clipboard = Clipboard::new().context("failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("failed to copy text to clipboard")
}

/// System clipboard via arboard (wl-copy inside Flatpak).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        copy_to_clipboard(text)
    }
}
