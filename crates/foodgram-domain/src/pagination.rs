//! Pagination types.

use serde::{Deserialize, Serialize};

/// Page size used when a request does not pass `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Upper bound accepted for `limit`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination parameters shared across all paginated list endpoints.
///
/// - `limit`: 1–100, default [`DEFAULT_PAGE_SIZE`]
/// - `page`: ≥ 1, default 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_page() -> u32 {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            page: default_page(),
        }
    }
}

impl PageRequest {
    /// Build from optional query values, falling back to defaults.
    pub fn from_query(limit: Option<u32>, page: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or_else(default_limit),
            page: page.unwrap_or_else(default_page),
        }
        .clamped()
    }

    /// Clamp `limit` to 1–100 and `page` to ≥ 1.
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
            page: self.page.max(1),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub fn has_next(&self, total: u64) -> bool {
        self.offset() + u64::from(self.limit) < total
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// One page of results plus the metadata clients use to walk the list.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Map the results while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
