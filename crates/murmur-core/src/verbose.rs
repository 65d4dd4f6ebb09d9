//! Debug logging for murmur operations.
//!
//! Call `set_verbose(true)` (the CLI does this for `--verbose`) and use the
//! `verbose!` macro for step-by-step detail. `warn!` always prints.
//!
//! Credential values must never be interpolated into either macro's
//! arguments; use [`crate::credential::redact`] on any text that might embed
//! one.

use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enable or disable verbose logging.
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::SeqCst);
}

/// Check if verbose logging is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Log a formatted message if verbose mode is enabled.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::verbose::is_verbose() {
            eprintln!("[murmur] {}", format!($($arg)*));
        }
    };
}

/// Log a warning unconditionally.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        eprintln!("[murmur] warning: {}", format!($($arg)*));
    };
}
