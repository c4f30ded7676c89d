//! The list store: query mutators, debounced fetch scheduling, and
//! generation-based race discarding.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use workboard_api::{ApiError, CollectionClient};
use workboard_core::{
    FilterValue, ListPage, MAX_PAGE_LIMIT, QueryState, Record, SortOrder, ViewMode, params,
};

use crate::address::AddressBar;
use crate::bulk::BulkPhase;
use crate::config::StoreConfig;
use crate::prefs::PreferenceStore;
use crate::selection::SelectionSet;
use crate::snapshot::{FetchFailure, ListSnapshot};

/// Mutable state behind the store's lock. Critical sections are short and
/// never held across an await.
pub(crate) struct State<T> {
    pub(crate) query: QueryState,
    pub(crate) items: Vec<T>,
    pub(crate) pagination: workboard_core::PageMeta,
    pub(crate) loading: bool,
    pub(crate) loaded_once: bool,
    pub(crate) error: Option<FetchFailure>,
    pub(crate) fetched_at: Option<chrono::DateTime<Utc>>,
    pub(crate) selection: SelectionSet,
    pub(crate) bulk_phase: BulkPhase,
    in_flight: Option<JoinHandle<()>>,
}

impl<T: Record> State<T> {
    /// Selected ids in display order.
    pub(crate) fn visible_selection(&self) -> Vec<String> {
        self.items
            .iter()
            .map(Record::id)
            .filter(|id| self.selection.contains(id))
            .map(str::to_owned)
            .collect()
    }
}

pub(crate) struct Inner<T> {
    pub(crate) client: CollectionClient,
    pub(crate) config: StoreConfig,
    generation: AtomicU64,
    pub(crate) state: Mutex<State<T>>,
    snapshot_tx: watch::Sender<ListSnapshot<T>>,
    prefs: Option<Arc<dyn PreferenceStore>>,
    address: Option<Arc<dyn AddressBar>>,
}

/// A poisoned lock only means a fetch task panicked mid-commit; the state
/// itself is still structurally valid, so recover it instead of propagating.
pub(crate) fn lock_state<T>(mutex: &Mutex<State<T>>) -> MutexGuard<'_, State<T>> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One screen's query controller.
///
/// Owns the screen's [`QueryState`], result set, and selection. Mutators
/// update state synchronously, then schedule a fetch; only the response
/// matching the latest-issued generation may commit, so out-of-order
/// arrivals can never clobber fresher state. Handles are cheap clones
/// sharing one store.
pub struct ListStore<T> {
    pub(crate) inner: Arc<Inner<T>>,
}

impl<T> Clone for ListStore<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> std::fmt::Debug for ListStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListStore")
            .field("screen_key", &self.inner.config.screen_key)
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .finish()
    }
}

/// Builder wiring the optional seams (preferences, address bar) before the
/// store starts broadcasting.
pub struct ListStoreBuilder<T> {
    client: CollectionClient,
    config: StoreConfig,
    prefs: Option<Arc<dyn PreferenceStore>>,
    address: Option<Arc<dyn AddressBar>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> ListStoreBuilder<T> {
    /// Persist and restore this screen's view mode through `prefs`.
    #[must_use]
    pub fn with_preferences(mut self, prefs: Arc<dyn PreferenceStore>) -> Self {
        self.prefs = Some(prefs);
        self
    }

    /// Deep-link this screen: seed the initial query from the address and
    /// mirror every mutation back (replace, never push).
    #[must_use]
    pub fn with_address_bar(mut self, address: Arc<dyn AddressBar>) -> Self {
        self.address = Some(address);
        self
    }

    /// Finish construction. The store starts idle; call
    /// [`ListStore::refresh`] to issue the first fetch.
    #[must_use]
    pub fn build(self) -> ListStore<T> {
        let mut query = match &self.address {
            Some(address) => params::from_params(&address.read(), &self.config.defaults),
            None => self.config.defaults.clone(),
        };
        if let Some(prefs) = &self.prefs {
            if let Some(mode) = prefs.get(&self.config.view_mode_key()).and_then(|v| ViewMode::parse(&v))
            {
                query.view_mode = mode;
            }
        }
        let (snapshot_tx, _) = watch::channel(ListSnapshot::initial(query.clone()));
        let state = State {
            query,
            items: Vec::new(),
            pagination: workboard_core::PageMeta::default(),
            loading: false,
            loaded_once: false,
            error: None,
            fetched_at: None,
            selection: SelectionSet::default(),
            bulk_phase: BulkPhase::Idle,
            in_flight: None,
        };
        ListStore {
            inner: Arc::new(Inner {
                client: self.client,
                config: self.config,
                generation: AtomicU64::new(0),
                state: Mutex::new(state),
                snapshot_tx,
                prefs: self.prefs,
                address: self.address,
            }),
        }
    }
}

impl<T> ListStore<T> {
    /// Start building a store for one screen.
    #[must_use]
    pub fn builder(client: CollectionClient, config: StoreConfig) -> ListStoreBuilder<T> {
        ListStoreBuilder { client, config, prefs: None, address: None, _record: PhantomData }
    }

    /// Receiver of snapshot updates; the UI re-renders from these.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<T>> {
        self.inner.snapshot_tx.subscribe()
    }
}

impl<T> ListStore<T>
where
    T: Record + Clone + DeserializeOwned + Send + Sync + 'static,
{
    /// Current snapshot (clone of the latest broadcast).
    #[must_use]
    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Current query state.
    #[must_use]
    pub fn query(&self) -> QueryState {
        lock_state(&self.inner.state).query.clone()
    }

    /// Wait until no fetch is pending or debouncing. Returns immediately if
    /// the store is already settled.
    pub async fn wait_settled(&self) {
        let mut rx = self.inner.snapshot_tx.subscribe();
        loop {
            if !rx.borrow_and_update().loading {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    // ── Query mutators ─────────────────────────────────────────────────

    /// Replace the free-text search. Debounced: rapid edits collapse into a
    /// single trailing request. An empty string is a real query, not a
    /// no-op.
    pub fn set_search(&self, text: impl Into<String>) {
        {
            let mut state = lock_state(&self.inner.state);
            state.query.search = text.into();
            state.query.page = 1;
        }
        self.schedule(true);
    }

    /// Set one named filter. Fetches immediately.
    pub fn set_filter(&self, key: impl Into<String>, value: impl Into<FilterValue>) {
        {
            let mut state = lock_state(&self.inner.state);
            state.query.filters.insert(key.into(), value.into());
            state.query.page = 1;
        }
        self.schedule(false);
    }

    /// Remove one named filter (the "undefined" case of a filter map).
    pub fn remove_filter(&self, key: &str) {
        {
            let mut state = lock_state(&self.inner.state);
            state.query.filters.remove(key);
            state.query.page = 1;
        }
        self.schedule(false);
    }

    /// Drop all filters.
    pub fn clear_filters(&self) {
        {
            let mut state = lock_state(&self.inner.state);
            state.query.filters.clear();
            state.query.page = 1;
        }
        self.schedule(false);
    }

    /// Change sort column and direction.
    pub fn set_sort(&self, sort_by: impl Into<String>, sort_order: SortOrder) {
        {
            let mut state = lock_state(&self.inner.state);
            state.query.sort_by = sort_by.into();
            state.query.sort_order = sort_order;
            state.query.page = 1;
        }
        self.schedule(false);
    }

    /// Navigate to a page, clamped into `[1, max(total_pages, 1)]` against
    /// the last-known pagination.
    pub fn go_to_page(&self, page: u32) {
        {
            let mut state = lock_state(&self.inner.state);
            state.query.page = state.pagination.clamp_page(page);
        }
        self.schedule(false);
    }

    /// Change the page size, repositioning so the first item of the old
    /// page stays visible under the new limit.
    pub fn set_limit(&self, limit: u32) {
        {
            let mut state = lock_state(&self.inner.state);
            let limit = limit.clamp(1, MAX_PAGE_LIMIT);
            let first_index =
                u64::from(state.query.page.saturating_sub(1)) * u64::from(state.query.limit);
            state.query.limit = limit;
            state.query.page = u32::try_from(first_index / u64::from(limit)).unwrap_or(u32::MAX - 1) + 1;
        }
        self.schedule(false);
    }

    /// Change the presentation mode. Persisted through the preference
    /// store; never refetches and never touches the address.
    pub fn set_view_mode(&self, mode: ViewMode) {
        {
            let mut state = lock_state(&self.inner.state);
            state.query.view_mode = mode;
        }
        if let Some(prefs) = &self.inner.prefs {
            prefs.set(&self.inner.config.view_mode_key(), mode.as_str());
        }
        self.publish();
    }

    /// Re-issue the current query unchanged (after a write elsewhere
    /// invalidated server data).
    pub fn refresh(&self) {
        self.schedule(false);
    }

    // ── Selection ──────────────────────────────────────────────────────

    /// Toggle one visible record in or out of the selection. Ids not on the
    /// current page are ignored.
    pub fn toggle_selected(&self, id: &str) {
        let changed = {
            let mut state = lock_state(&self.inner.state);
            if state.items.iter().any(|record| record.id() == id) {
                state.selection.toggle(id);
                true
            } else {
                false
            }
        };
        if changed {
            self.publish();
        }
    }

    /// Select exactly the ids on the current page — never the server-side
    /// total, so bulk intent stays bounded by what is on screen.
    pub fn select_visible(&self) {
        {
            let mut state = lock_state(&self.inner.state);
            let ids: Vec<String> = state.items.iter().map(|r| r.id().to_owned()).collect();
            state.selection.extend_from(ids.iter().map(String::as_str));
        }
        self.publish();
    }

    /// Deselect everything.
    pub fn clear_selection(&self) {
        lock_state(&self.inner.state).selection.clear();
        self.publish();
    }

    /// Selected ids in display order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<String> {
        lock_state(&self.inner.state).visible_selection()
    }

    // ── Scheduling and commit ──────────────────────────────────────────

    /// Bump the generation, mark loading, and spawn the fetch task.
    ///
    /// Aborting the previous in-flight task is a best-effort optimization;
    /// correctness rests on the generation check in [`Self::commit`].
    pub(crate) fn schedule(&self, debounced: bool) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = {
            let mut state = lock_state(&self.inner.state);
            state.loading = true;
            state.selection.clear();
            if let Some(previous) = state.in_flight.take() {
                previous.abort();
            }
            state.query.clone()
        };
        self.sync_address(&query);
        self.publish();

        let store = self.clone();
        let handle = tokio::spawn(async move {
            if debounced {
                tokio::time::sleep(store.inner.config.debounce).await;
                if store.inner.generation.load(Ordering::SeqCst) != generation {
                    tracing::debug!(generation, "debounce timer superseded");
                    return;
                }
            }
            tracing::debug!(
                generation,
                endpoint = store.inner.client.endpoint(),
                page = query.page,
                "issuing list fetch"
            );
            let result = store.inner.client.fetch_page::<T>(&query).await;
            store.commit(generation, result);
        });
        lock_state(&self.inner.state).in_flight = Some(handle);
    }

    /// Apply a fetch outcome, unless a newer generation has been issued
    /// since — stale responses are dropped unconditionally, even successes.
    fn commit(&self, generation: u64, result: Result<ListPage<T>, ApiError>) {
        let reclamp = {
            let mut state = lock_state(&self.inner.state);
            if self.inner.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "dropping stale response");
                return;
            }
            match result {
                Ok(page) => {
                    state.items = page.items;
                    state.pagination = page.pagination;
                    state.loaded_once = true;
                    state.error = None;
                    state.fetched_at = Some(Utc::now());
                    // The dataset may have shrunk between request and
                    // response; settle on the last real page. Loading stays
                    // up through the re-clamp fetch so waiters never see a
                    // half-settled page.
                    let max_page = state.pagination.max_page();
                    if state.query.page > max_page {
                        state.query.page = max_page;
                        true
                    } else {
                        state.loading = false;
                        false
                    }
                },
                Err(err) => {
                    tracing::warn!(generation, error = %err, "list fetch failed");
                    // Keep last-known-good rows; first-load failures leave
                    // the empty list for the dedicated error state.
                    state.error = Some(FetchFailure::from(&err));
                    state.loading = false;
                    false
                },
            }
        };
        self.publish();
        if reclamp {
            self.schedule(false);
        }
    }

    fn sync_address(&self, query: &QueryState) {
        if let Some(address) = &self.inner.address {
            address.replace(params::to_params(query, &self.inner.config.defaults));
        }
    }

    #[cfg(test)]
    pub(crate) fn force_generation(&self, generation: u64) {
        self.inner.generation.store(generation, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(crate) fn commit_for_test(&self, generation: u64, result: Result<ListPage<T>, ApiError>) {
        self.commit(generation, result);
    }

    /// Broadcast the current state to all subscribers.
    pub(crate) fn publish(&self) {
        let snapshot = {
            let state = lock_state(&self.inner.state);
            ListSnapshot {
                items: state.items.clone(),
                pagination: state.pagination,
                query: state.query.clone(),
                selected: state.visible_selection(),
                loading: state.loading,
                loaded_once: state.loaded_once,
                error: state.error.clone(),
                fetched_at: state.fetched_at,
                bulk_phase: state.bulk_phase,
            }
        };
        self.inner.snapshot_tx.send_replace(snapshot);
    }
}
