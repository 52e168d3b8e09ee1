//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Page size used when `limit` is absent.
pub const DEFAULT_PAGE_SIZE: i64 = 50;
/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `limit` clamped to `1..=MAX_PAGE_SIZE`, defaulting to `DEFAULT_PAGE_SIZE`.
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
