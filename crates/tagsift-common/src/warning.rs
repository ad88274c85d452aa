//! Parser warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the tokenizer and tree builder to report markup they consume
//! without representing it in the tree (processing instructions, CDATA).

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about dropped or unsupported markup (prints once per unique message)
///
/// Every call is also forwarded to `tracing` at warn level, so a subscriber
/// sees the warning even when stderr is not a terminal.
///
/// # Example
/// ```ignore
/// warn_once("HTML Tokenizer", "dropping processing instruction <?xml ...?>");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        tracing::warn!(component = component, "{message}");
        eprintln!("{}", format!("[tagsift {component}] ⚠ {message}").yellow());
    }
}

/// Returns true if this exact warning has already been printed.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call when loading a new document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
