//! List store and bulk mutation coordinator.
//!
//! One [`ListStore`] instance per mounted screen owns that screen's query
//! state, result set, and selection. Mutators are the only legal way to
//! change the query; every mutation schedules a fetch through the debounced
//! scheduler, and a monotonic generation counter makes stale responses inert
//! instead of racing fresher ones. Bulk mutations fan out one PATCH per
//! selected id and report per-id outcomes without rollback.

mod address;
mod bulk;
mod config;
mod prefs;
mod selection;
mod snapshot;
mod store;

#[cfg(test)]
mod store_tests;

pub use address::{AddressBar, MemoryAddressBar};
pub use bulk::{BulkFailure, BulkPhase, BulkReport};
pub use config::StoreConfig;
pub use prefs::{MemoryPrefs, PreferenceStore};
pub use selection::SelectionSet;
pub use snapshot::{FetchFailure, ListSnapshot};
pub use store::{ListStore, ListStoreBuilder};
