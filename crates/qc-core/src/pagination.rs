//! Pagination parameters
//!
//! The composer only carries `perPage` and `paginated`; this turns them into
//! the limit/offset pair a query layer understands.

use serde::{Deserialize, Serialize};

/// Upper bound applied to page sizes unless configured otherwise
pub const DEFAULT_MAX_PER_PAGE: i64 = 1000;

/// Pagination parameters (from query string)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    15
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self::bounded(page, per_page, DEFAULT_MAX_PER_PAGE)
    }

    /// Build parameters with a custom page size ceiling
    pub fn bounded(page: i64, per_page: i64, max_per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, max_per_page.max(1)),
        }
    }

    /// Calculate the SQL offset, saturating for out-of-range pages
    pub fn offset(&self) -> i64 {
        self.page
            .max(1)
            .saturating_sub(1)
            .saturating_mul(self.per_page.max(0))
    }

    /// Calculate the SQL limit
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Number of pages needed for `total` items
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let per_page = self.per_page.max(1);
        (total - 1) / per_page + 1
    }
}
