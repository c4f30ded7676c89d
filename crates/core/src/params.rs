//! URL parameter round-trip for deep-linkable queries.
//!
//! Maps a [`QueryState`](crate::QueryState) to a flat `key -> value` map and
//! back, without depending on any particular router. Default-valued
//! parameters are omitted so shared URLs stay minimal; unknown or
//! unparseable parameters fall back to the screen's defaults instead of
//! erroring. View mode is a local preference and never appears here.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::{FilterValue, MAX_PAGE_LIMIT, QueryState, SortOrder};

/// Parameter keys with fixed meaning; every other key is a filter.
pub const RESERVED_KEYS: [&str; 5] = ["search", "sort_by", "sort_order", "page", "limit"];

fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Serialize a query into address parameters, omitting anything equal to the
/// screen's `base` (default) state.
#[must_use]
pub fn to_params(state: &QueryState, base: &QueryState) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    if state.search != base.search {
        params.insert("search".to_owned(), state.search.clone());
    }
    if state.sort_by != base.sort_by {
        params.insert("sort_by".to_owned(), state.sort_by.clone());
    }
    if state.sort_order != base.sort_order {
        params.insert("sort_order".to_owned(), state.sort_order.as_str().to_owned());
    }
    if state.page != base.page {
        params.insert("page".to_owned(), state.page.to_string());
    }
    if state.limit != base.limit {
        params.insert("limit".to_owned(), state.limit.to_string());
    }
    for (key, value) in &state.filters {
        if is_reserved(key) {
            continue;
        }
        if base.filters.get(key) == Some(value) {
            continue;
        }
        params.insert(key.clone(), value.as_param());
    }
    params
}

/// Parse address parameters into a query, starting from the screen's `base`
/// (default) state. Invalid values are ignored, not errors: a shared URL
/// with a mangled `page` still opens the screen.
#[must_use]
pub fn from_params(params: &BTreeMap<String, String>, base: &QueryState) -> QueryState {
    let mut state = base.clone();
    for (key, value) in params {
        match key.as_str() {
            "search" => state.search = value.clone(),
            "sort_by" => {
                if !value.is_empty() {
                    state.sort_by = value.clone();
                }
            },
            "sort_order" => {
                if let Some(order) = SortOrder::parse(value) {
                    state.sort_order = order;
                }
            },
            "page" => {
                if let Ok(page) = value.parse::<u32>() {
                    if page >= 1 {
                        state.page = page;
                    }
                }
            },
            "limit" => {
                if let Ok(limit) = value.parse::<u32>() {
                    if limit >= 1 {
                        state.limit = limit.min(MAX_PAGE_LIMIT);
                    }
                }
            },
            _ => {
                state.filters.insert(key.clone(), FilterValue::from_param(value));
            },
        }
    }
    state
}

/// Encode a parameter map as a query string (no leading `?`).
#[must_use]
pub fn encode(params: &BTreeMap<String, String>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Decode a query string (with or without leading `?`) into a parameter map.
/// Repeated keys keep the last occurrence.
#[must_use]
pub fn decode(query: &str) -> BTreeMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
