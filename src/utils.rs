//! Utility functions for pancam.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

/// Global set of warned messages (for warn_once).
static WARNED_MESSAGES: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Emit a warning only once per process.
///
/// Subsequent calls with the same message are ignored. Returns whether the
/// message was emitted.
pub fn warn_once(message: &str) -> bool {
    let warned = WARNED_MESSAGES.get_or_init(|| Mutex::new(HashSet::new()));
    let mut guard = match warned.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if guard.insert(message.to_string()) {
        tracing::warn!("{}", message);
        true
    } else {
        false
    }
}
