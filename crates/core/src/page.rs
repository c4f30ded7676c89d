use serde::{Deserialize, Serialize};

use crate::DEFAULT_PAGE_LIMIT;

/// Pagination metadata reported by the collection API.
///
/// `total_pages` is `ceil(total / limit)`; the server computes it, but
/// [`PageMeta::pages_for`] exists for local recomputation and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self { total: 0, page: 1, limit: DEFAULT_PAGE_LIMIT, total_pages: 0 }
    }
}

impl PageMeta {
    /// Number of pages needed for `total` items at `limit` per page.
    #[must_use]
    pub const fn pages_for(total: u64, limit: u32) -> u32 {
        if limit == 0 {
            return 0;
        }
        (total.div_ceil(limit as u64)) as u32
    }

    /// Highest page a caller may navigate to. Always at least 1, so an
    /// empty collection still has a "page 1".
    #[must_use]
    pub const fn max_page(&self) -> u32 {
        if self.total_pages == 0 { 1 } else { self.total_pages }
    }

    /// Clamp a requested page into `[1, max_page]`.
    #[must_use]
    pub const fn clamp_page(&self, requested: u32) -> u32 {
        let max = self.max_page();
        if requested == 0 {
            1
        } else if requested > max {
            max
        } else {
            requested
        }
    }
}

/// One page of records plus its pagination metadata, exactly as the server
/// answered. Replaced wholesale on every accepted response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPage<T> {
    #[serde(rename = "data")]
    pub items: Vec<T>,
    pub pagination: PageMeta,
}
