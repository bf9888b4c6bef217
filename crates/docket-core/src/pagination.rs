//! Pagination utilities for list endpoints.
//!
//! Paged routes take `page` and `limit` as path segments
//! (`GET /api/device/{page}/{limit}`):
//! - `page`: Page number (1-indexed, clamped to a minimum of 1)
//! - `limit`: Items per page (clamped to 1-100)
//!
//! # Example
//!
//! ```ignore
//! let params = PageParams::parse("3", "20")?;
//! let items = repo.find_many(&filter, Some(Page::from(&params))).await?;
//! let total = repo.get_count(&filter).await?;
//!
//! let reply = Reply::success(Paginated::new(items, total, &params));
//! ```

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Metadata about a paginated response.
///
/// ```json
/// {
///   "data": [...],
///   "meta": { "total": 100, "limit": 10, "page": 3, "has_more": true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: u64,
    /// The limit that was applied
    pub limit: i64,
    /// Current page number
    pub page: i64,
    /// Whether there are more items after this page
    pub has_more: bool,
}

/// Page and limit requested by a client.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageParams {
    /// Parses raw path segments. Non-numeric input is a bad request.
    pub fn parse(page: &str, limit: &str) -> Result<Self, AppError> {
        let page = page
            .parse::<i64>()
            .map_err(|_| AppError::bad_request(anyhow!("page must be an integer")))?;
        let limit = limit
            .parse::<i64>()
            .map_err(|_| AppError::bad_request(anyhow!("limit must be an integer")))?;

        Ok(Self { page, limit })
    }

    /// Returns the effective limit, clamped to [1, 100].
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Returns the page number, clamped to a minimum of 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Number of items to skip: `(page - 1) * limit`.
    #[must_use]
    pub fn skip(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// One page of results plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, params: &PageParams) -> Self {
        let seen = params.skip().max(0) as u64 + data.len() as u64;
        let meta = PaginationMeta {
            total,
            limit: params.limit(),
            page: params.page(),
            has_more: seen < total,
        };
        Self { data, meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_page_params_default() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.skip(), 0);
    }

    #[test]
    fn test_skip_from_page() {
        let params = PageParams { page: 3, limit: 20 };
        assert_eq!(params.skip(), 40);
    }

    #[test]
    fn test_limit_min_boundary() {
        let params = PageParams { page: 1, limit: 0 };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_limit_max_boundary() {
        let params = PageParams { page: 1, limit: 150 };
        assert_eq!(params.limit(), 100);
    }

    #[test]
    fn test_limit_negative() {
        let params = PageParams { page: 1, limit: -10 };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_page_zero_and_negative_clamp_to_first() {
        let params = PageParams { page: 0, limit: 10 };
        assert_eq!(params.page(), 1);
        assert_eq!(params.skip(), 0);

        let params = PageParams { page: -4, limit: 10 };
        assert_eq!(params.skip(), 0);
    }

    #[test]
    fn test_parse_valid_segments() {
        let params = PageParams::parse("2", "5").unwrap();
        assert_eq!(params, PageParams { page: 2, limit: 5 });
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err = PageParams::parse("two", "5").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = PageParams::parse("1", "").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_paginated_has_more() {
        let params = PageParams { page: 1, limit: 2 };
        let page = Paginated::new(vec![1, 2], 5, &params);
        assert!(page.meta.has_more);
        assert_eq!(page.meta.total, 5);

        let params = PageParams { page: 3, limit: 2 };
        let page = Paginated::new(vec![5], 5, &params);
        assert!(!page.meta.has_more);
    }

    #[test]
    fn test_paginated_past_the_end() {
        let params = PageParams { page: 10, limit: 10 };
        let page: Paginated<i32> = Paginated::new(vec![], 3, &params);
        assert!(page.data.is_empty());
        assert!(!page.meta.has_more);
    }

    #[test]
    fn test_pagination_meta_serialize() {
        let meta = PaginationMeta {
            total: 100,
            limit: 20,
            page: 3,
            has_more: true,
        };
        let serialized = serde_json::to_string(&meta).unwrap();
        assert!(serialized.contains(r#""total":100"#));
        assert!(serialized.contains(r#""limit":20"#));
        assert!(serialized.contains(r#""page":3"#));
        assert!(serialized.contains(r#""has_more":true"#));
    }
}
