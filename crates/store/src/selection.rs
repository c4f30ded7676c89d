//! Selection of currently-displayed record ids for bulk action.

use std::collections::HashSet;

/// Set of record ids chosen for a bulk action.
///
/// Only ids present in the current result set belong here; the store clears
/// the whole set whenever it schedules a refetch, since a selection is only
/// meaningful relative to one result set.
#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    /// Toggle one id; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_owned());
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn extend_from<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.ids.extend(ids.into_iter().map(str::to_owned));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
