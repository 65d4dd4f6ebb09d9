//! Credential access and redaction.
//!
//! The core never owns or persists the API key: it reads it through a
//! [`CredentialStore`] at the moment of use, and every diagnostic string that
//! could embed it passes through [`redact`] first.

use std::env;

use crate::settings::Settings;

/// Marker substituted for the credential in diagnostic output.
pub const REDACTION_MARKER: &str = "API_KEY_HIDDEN";

/// Replace every occurrence of `credential` in `text` with the redaction
/// marker. A no-op for empty credentials.
pub fn redact(text: &str, credential: &str) -> String {
    if credential.is_empty() {
        text.to_string()
    } else {
        text.replace(credential, REDACTION_MARKER)
    }
}

/// Read access to the externally persisted credential.
pub trait CredentialStore: Send + Sync {
    /// Current credential. `None` (or empty) means unset.
    fn credential(&self) -> Option<String>;
}

/// Reads the credential from the settings file, falling back to the
/// `OPENAI_API_KEY` environment variable.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettingsCredentials;

impl CredentialStore for SettingsCredentials {
    fn credential(&self) -> Option<String> {
        Settings::load()
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                env::var("OPENAI_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_replaces_every_occurrence() {
        let redacted = redact("Bearer sk-123 then sk-123 again", "sk-123");
        assert_eq!(
            redacted,
            "Bearer API_KEY_HIDDEN then API_KEY_HIDDEN again"
        );
    }

    #[test]
    fn redact_with_empty_credential_is_a_no_op() {
        assert_eq!(redact("nothing to hide", ""), "nothing to hide");
    }
}
