//! Rendered view of a list store at one point in time.

use chrono::{DateTime, Utc};
use workboard_api::ApiError;
use workboard_core::{PageMeta, QueryState};

use crate::bulk::BulkPhase;

/// Cloneable fetch failure for snapshots.
///
/// The rendered list must survive a failed refresh, so failures live in the
/// snapshot instead of propagating; `transient`/`auth` let the UI choose
/// between a retry action and a re-login prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub message: String,
    pub transient: bool,
    pub auth: bool,
}

impl From<&ApiError> for FetchFailure {
    fn from(err: &ApiError) -> Self {
        Self { message: err.to_string(), transient: err.is_transient(), auth: err.is_auth() }
    }
}

/// Everything a screen needs to render, broadcast on every change.
///
/// `items`/`pagination` are always exactly the last accepted server answer
/// for the last issued query; a failed refresh keeps the previous rows and
/// surfaces `error` alongside them. `loaded_once` distinguishes "first load
/// failed" (empty + error banner) from "refresh failed while stale data
/// exists".
#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
    pub query: QueryState,
    /// Selected ids in visible (display) order.
    pub selected: Vec<String>,
    pub loading: bool,
    pub loaded_once: bool,
    pub error: Option<FetchFailure>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub bulk_phase: BulkPhase,
}

impl<T> ListSnapshot<T> {
    pub(crate) fn initial(query: QueryState) -> Self {
        Self {
            items: Vec::new(),
            pagination: PageMeta::default(),
            query,
            selected: Vec::new(),
            loading: false,
            loaded_once: false,
            error: None,
            fetched_at: None,
            bulk_phase: BulkPhase::Idle,
        }
    }
}
