//! Navigable-address seam for deep-linkable queries.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Flat key/value view of the navigable address's query parameters.
///
/// `replace` must not create a navigation history entry — a keystroke-driven
/// query change is not a navigation. The store reads once at construction
/// and writes after every query mutation.
pub trait AddressBar: Send + Sync {
    fn read(&self) -> BTreeMap<String, String>;
    fn replace(&self, params: BTreeMap<String, String>);
}

/// In-process address bar for tests and headless embedding.
#[derive(Debug, Default)]
pub struct MemoryAddressBar {
    params: Mutex<BTreeMap<String, String>>,
}

impl MemoryAddressBar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a query string, e.g. `"?search=rust&page=3"`.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self { params: Mutex::new(workboard_core::params::decode(query)) }
    }

    /// Current parameters encoded as a query string (no leading `?`).
    #[must_use]
    pub fn query_string(&self) -> String {
        workboard_core::params::encode(&self.read())
    }
}

impl AddressBar for MemoryAddressBar {
    fn read(&self) -> BTreeMap<String, String> {
        self.params.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    fn replace(&self, params: BTreeMap<String, String>) {
        *self.params.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = params;
    }
}
