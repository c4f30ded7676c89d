use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_PAGE_LIMIT, DEFAULT_SORT_BY};

/// Value of a single named filter.
///
/// Absent keys mean "no filter"; callers remove a key instead of storing an
/// empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Flag(bool),
}

impl FilterValue {
    /// Render the value as a query-parameter string.
    #[must_use]
    pub fn as_param(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Flag(b) => b.to_string(),
        }
    }

    /// Parse a query-parameter string back into a value.
    ///
    /// `"true"`/`"false"` become flags, everything else is text. A text
    /// filter that happens to spell a boolean round-trips to the same
    /// parameter string either way.
    #[must_use]
    pub fn from_param(raw: &str) -> Self {
        match raw {
            "true" => Self::Flag(true),
            "false" => Self::Flag(false),
            _ => Self::Text(raw.to_owned()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse a query-parameter string; unknown values yield `None` so
    /// callers can fall back to their default.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Per-screen presentation mode.
///
/// A local persisted preference: never part of the query sent to the API and
/// never part of a shareable URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Grid,
    Table,
    Split,
}

impl ViewMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Table => "table",
            Self::Split => "split",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "grid" => Some(Self::Grid),
            "table" => Some(Self::Table),
            "split" => Some(Self::Split),
            _ => None,
        }
    }
}

/// Complete description of what subset, order, and page of a collection is
/// currently requested.
///
/// Owned exclusively by the list store; everything else sees cloned
/// snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryState {
    pub search: String,
    pub filters: BTreeMap<String, FilterValue>,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
    pub view_mode: ViewMode,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            sort_by: DEFAULT_SORT_BY.to_owned(),
            sort_order: SortOrder::Desc,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            view_mode: ViewMode::Grid,
        }
    }
}

impl QueryState {
    /// A default query sorted by the given column.
    #[must_use]
    pub fn sorted_by(sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        Self { sort_by: sort_by.into(), sort_order, ..Self::default() }
    }

    /// Query pairs for the collection API request.
    ///
    /// Always carries `page`, `limit`, `sort_by`, and `sort_order`; `search`
    /// only when non-empty; one pair per active filter. View mode is local
    /// state and never leaves the client.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_owned(), self.page.to_string()),
            ("limit".to_owned(), self.limit.to_string()),
            ("sort_by".to_owned(), self.sort_by.clone()),
            ("sort_order".to_owned(), self.sort_order.as_str().to_owned()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search".to_owned(), self.search.clone()));
        }
        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.as_param()));
        }
        pairs
    }
}
