//! Durable key-value storage for per-screen UI preferences.

use std::collections::HashMap;
use std::sync::Mutex;

/// Simple get/set string storage with no expiry.
///
/// Injected into the store rather than reached into ad hoc; each screen
/// writes under its own key (see
/// [`StoreConfig::view_mode_key`](crate::StoreConfig::view_mode_key)).
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-process preference store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPrefs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
    }
}
