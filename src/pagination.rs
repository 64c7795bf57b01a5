use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 50;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PageQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

/// Sanitized page window: `page >= 1`, `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn from_query(query: &PageQuery) -> Self {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        PageWindow { page, limit }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub total_posts: u64,
}

impl Pagination {
    /// The total is counted independently of the page slice, so a page past
    /// the end still reports an honest `total_pages` and `has_next_page: false`.
    pub fn compute(window: PageWindow, total: u64) -> Self {
        let total_pages = (total.div_ceil(window.limit)).max(1);
        Pagination {
            current_page: window.page,
            total_pages,
            has_next_page: window.page < total_pages,
            total_posts: total,
        }
    }
}
