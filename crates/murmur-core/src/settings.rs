//! Persisted configuration.
//!
//! Owned by the preferences surface, read-only to the lifecycle core: the
//! API key, capture options, and the toggle shortcut with its backup slot.
//! Loading never fails: a missing or unparseable file yields defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Binding restored when the toggle shortcut is re-enabled with no backup.
pub const DEFAULT_TOGGLE_SHORTCUT: &str = "<Control><Alt>a";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// OpenAI API key. `None` means unset; the environment may still
    /// provide one at read time.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Transcription model name sent with each request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Capture input backend passed to ffmpeg's `-f` flag (alsa, pulse).
    #[serde(default = "default_input_backend")]
    pub input_backend: String,

    /// Capture audio codec passed to ffmpeg's `-c:a` flag.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Accelerator that toggles recording. Empty (or a single empty string)
    /// means disabled.
    #[serde(default)]
    pub toggle_shortcut: Vec<String>,

    /// Previous binding, stashed when the shortcut is disabled.
    #[serde(default)]
    pub toggle_shortcut_backup: Vec<String>,
}

fn default_model() -> String {
    "whisper-1".to_string()
}

fn default_input_backend() -> String {
    "alsa".to_string()
}

fn default_audio_codec() -> String {
    "libvorbis".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            input_backend: default_input_backend(),
            audio_codec: default_audio_codec(),
            toggle_shortcut: vec![DEFAULT_TOGGLE_SHORTCUT.to_string()],
            toggle_shortcut_backup: Vec::new(),
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("murmur")
            .join("settings.json")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self).context("failed to encode settings")?;
        fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
    }

    /// The active toggle binding, if any.
    pub fn shortcut(&self) -> Option<&str> {
        self.toggle_shortcut
            .first()
            .map(String::as_str)
            .filter(|binding| !binding.is_empty())
    }

    pub fn set_shortcut(&mut self, binding: &str) {
        self.toggle_shortcut = vec![binding.to_string()];
    }

    /// Disable the toggle shortcut, stashing the current binding so a later
    /// enable can restore it.
    pub fn disable_shortcut(&mut self) {
        if let Some(current) = self.shortcut() {
            self.toggle_shortcut_backup = vec![current.to_string()];
        }
        self.toggle_shortcut = vec![String::new()];
    }

    /// Re-enable the toggle shortcut from the backup slot, or the default
    /// binding when no backup exists.
    pub fn enable_shortcut(&mut self) {
        let restored = self
            .toggle_shortcut_backup
            .first()
            .filter(|binding| !binding.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_TOGGLE_SHORTCUT.to_string());
        self.toggle_shortcut = vec![restored];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("murmur").join("settings.json");

        let mut settings = Settings::default();
        settings.api_key = Some("sk-test".to_string());
        settings.model = "whisper-large".to_string();
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn missing_or_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(Settings::load_from(&missing), Settings::default());

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{not json").unwrap();
        assert_eq!(Settings::load_from(&corrupt), Settings::default());
    }

    #[test]
    fn disabling_stashes_the_binding_and_enabling_restores_it() {
        let mut settings = Settings::default();
        settings.set_shortcut("<Super>r");

        settings.disable_shortcut();
        assert_eq!(settings.shortcut(), None);
        assert_eq!(settings.toggle_shortcut_backup, vec!["<Super>r"]);

        settings.enable_shortcut();
        assert_eq!(settings.shortcut(), Some("<Super>r"));
    }

    #[test]
    fn enabling_without_backup_uses_the_default_binding() {
        let mut settings = Settings::default();
        settings.toggle_shortcut = vec![String::new()];
        settings.toggle_shortcut_backup = Vec::new();

        settings.enable_shortcut();
        assert_eq!(settings.shortcut(), Some(DEFAULT_TOGGLE_SHORTCUT));
    }

    #[test]
    fn disabling_an_already_disabled_shortcut_keeps_the_backup() {
        let mut settings = Settings::default();
        settings.set_shortcut("<Super>r");
        settings.disable_shortcut();
        settings.disable_shortcut();
        assert_eq!(settings.toggle_shortcut_backup, vec!["<Super>r"]);
    }
}
