//! Listing pagination: request parameters, validated bounds and result pages.

use serde::{Deserialize, Serialize};

use crate::{config::PageLimits, error::AppError};

/// Query string accepted by listing endpoints.
///
/// # Example
///
/// `GET /api/v1/auth-keys?page=2&page_size=25`
///
/// Both fields are optional. Values are signed so that negative input
/// reaches validation instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    /// 1-based page number (defaults to 1)
    pub page: Option<i64>,

    /// Records per page (defaults to the configured default page size)
    pub page_size: Option<i64>,
}

/// Validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    page_size: i64,
}

impl Pagination {
    /// Validate a page request against the configured limits.
    ///
    /// # Errors
    ///
    /// `InvalidPagination` when the page size is non-positive or above the
    /// configured maximum, or when the page number is below 1.
    pub fn new(page: i64, page_size: i64, limits: PageLimits) -> Result<Self, AppError> {
        if page_size <= 0 {
            return Err(AppError::InvalidPagination(
                "page_size must be positive".to_string(),
            ));
        }
        if page_size > i64::from(limits.max_page_size) {
            return Err(AppError::InvalidPagination(format!(
                "page_size must not exceed {}",
                limits.max_page_size
            )));
        }
        if page < 1 {
            return Err(AppError::InvalidPagination(
                "page must be 1 or greater".to_string(),
            ));
        }
        // Offsets beyond i64 can't address any row anyway.
        if (page - 1).checked_mul(page_size).is_none() {
            return Err(AppError::InvalidPagination("page is out of range".to_string()));
        }

        Ok(Self { page, page_size })
    }

    /// Build from query parameters, filling omitted values with defaults.
    pub fn from_query(query: &PaginationQuery, limits: PageLimits) -> Result<Self, AppError> {
        Self::new(
            query.page.unwrap_or(1),
            query
                .page_size
                .unwrap_or_else(|| i64::from(limits.default_page_size)),
            limits,
        )
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    /// Maximum number of rows to fetch (SQL `LIMIT`).
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Number of rows to skip (SQL `OFFSET`).
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// One page of results plus the totals needed to fetch the rest.
///
/// # JSON Example
///
/// ```json
/// {
///   "results": [ ... ],
///   "page": 1,
///   "page_size": 20,
///   "total_results": 42,
///   "total_pages": 3,
///   "next_page": 2
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_results: i64,
    pub total_pages: i64,
    /// Page number to request next, `null` on the last page
    pub next_page: Option<i64>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, pagination: Pagination, total_results: i64) -> Self {
        let page = pagination.page();
        let page_size = pagination.limit();
        let total_pages = (total_results + page_size - 1) / page_size;
        Self {
            results,
            page,
            page_size,
            total_results,
            total_pages,
            next_page: (page < total_pages).then(|| page + 1),
        }
    }

    /// Convert every result, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_results: self.total_results,
            total_pages: self.total_pages,
            next_page: self.next_page,
        }
    }
}
