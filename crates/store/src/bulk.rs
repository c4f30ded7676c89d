//! Bulk mutation coordinator: one concurrent PATCH per selected id,
//! aggregated into a per-id outcome report.

use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use workboard_core::{MAX_BULK_IDS, Record};

use crate::store::{ListStore, lock_state};

/// Lifecycle of the screen's bulk operation as a whole.
///
/// No cancelled state: once dispatched, in-flight writes are not abortable
/// (the API offers no compensating transaction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkPhase {
    #[default]
    Idle,
    Dispatching,
    Completed,
}

/// One id that failed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    pub id: String,
    pub error: String,
}

/// Per-id outcomes of a completed bulk operation, in dispatch order.
///
/// Partial success is a valid terminal state — ids in `succeeded` stay
/// mutated even when siblings failed. The UI surfaces the split
/// ("4 of 5 updated; 1 failed").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

impl BulkReport {
    /// Total number of dispatched writes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && !self.succeeded.is_empty()
    }
}

impl<T> ListStore<T>
where
    T: Record + Clone + DeserializeOwned + Send + Sync + 'static,
{
    /// Run a bulk operation over the current selection.
    ///
    /// Dispatches one PATCH per selected id concurrently, with `payload` as
    /// the opaque action-specific body; each write's failure is isolated so
    /// one failing id cannot abort its siblings, and nothing is ever rolled
    /// back or retried. On completion — partial failure included — the
    /// store refreshes so the rendered rows reflect server truth, and the
    /// selection is cleared. An empty selection returns an empty report
    /// without touching the network.
    pub async fn run_bulk(&self, action_kind: impl Into<String>, payload: Value) -> BulkReport {
        let action_kind = action_kind.into();
        let targets = {
            let mut state = lock_state(&self.inner.state);
            let mut targets = state.visible_selection();
            if targets.is_empty() {
                return BulkReport::default();
            }
            if targets.len() > MAX_BULK_IDS {
                tracing::warn!(
                    action = %action_kind,
                    selected = targets.len(),
                    cap = MAX_BULK_IDS,
                    "bulk selection over cap, truncating"
                );
                targets.truncate(MAX_BULK_IDS);
            }
            state.bulk_phase = BulkPhase::Dispatching;
            targets
        };
        self.publish();
        tracing::debug!(action = %action_kind, count = targets.len(), "dispatching bulk operation");

        let writes = targets.iter().map(|id| {
            let client = self.inner.client.clone();
            let payload = &payload;
            async move { client.patch(id, payload).await }
        });
        let outcomes = join_all(writes).await;

        let mut report = BulkReport::default();
        for (id, outcome) in targets.into_iter().zip(outcomes) {
            match outcome {
                Ok(()) => report.succeeded.push(id),
                Err(err) => report.failed.push(BulkFailure { id, error: err.to_string() }),
            }
        }
        tracing::info!(
            action = %action_kind,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "bulk operation completed"
        );

        {
            let mut state = lock_state(&self.inner.state);
            state.bulk_phase = BulkPhase::Completed;
            state.selection.clear();
        }
        self.refresh();
        report
    }
}
