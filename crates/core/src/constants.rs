//! Shared constants for workboard.
//!
//! Centralizes defaults used by both the query types and the store config.

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_LIMIT: u32 = 25;

/// Maximum accepted page size (protects the backend from unbounded queries).
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Default trailing debounce for free-text search input, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 275;

/// Default sort column for screens that do not configure one.
pub const DEFAULT_SORT_BY: &str = "created_at";

/// Maximum number of ids accepted by a single bulk operation.
pub const MAX_BULK_IDS: usize = 100;
