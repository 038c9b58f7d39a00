//! Pagination primitives
//!
//! Every list endpoint shares the same 1-based page/limit shape and the
//! same result metadata. The paging counter is derived from page and
//! limit alone, so it stays correct while the underlying data mutates
//! between page loads.

use serde::Serialize;

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound on page size to keep result sets bounded
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Clamp raw query parameters into a valid request.
    ///
    /// Page numbers below 1 become 1; limits are clamped to
    /// `1..=MAX_PAGE_SIZE` with `DEFAULT_PAGE_SIZE` as the fallback.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Row offset of the first item on this page
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// 1-based index of the first item on this page
    pub fn paging_counter(&self) -> i64 {
        self.offset() + 1
    }
}

/// Sort direction for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse `asc`/`desc` (case-insensitive); anything else falls back
    /// to the given default.
    pub fn parse_or(raw: Option<&str>, default: SortDirection) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
            Some(s) if s.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => default,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One page of results plus pagination metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_results: i64,
    pub page_size: u32,
    pub current_page: u32,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
    pub paging_counter: i64,
}

impl<T> Page<T> {
    /// Assemble a page from its rows and the total match count.
    pub fn new(items: Vec<T>, total_results: i64, request: PageRequest) -> Self {
        let total_pages = if total_results == 0 {
            1
        } else {
            (total_results + request.limit as i64 - 1) / request.limit as i64
        };
        let has_next_page = (request.page as i64) < total_pages;
        let has_prev_page = request.page > 1;

        Self {
            items,
            total_results,
            page_size: request.limit,
            current_page: request.page,
            total_pages,
            has_next_page,
            has_prev_page,
            next_page: has_next_page.then(|| request.page + 1),
            prev_page: has_prev_page.then(|| request.page - 1),
            paging_counter: request.paging_counter(),
        }
    }

    /// Map the item type while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_results: self.total_results,
            page_size: self.page_size,
            current_page: self.current_page,
            total_pages: self.total_pages,
            has_next_page: self.has_next_page,
            has_prev_page: self.has_prev_page,
            next_page: self.next_page,
            prev_page: self.prev_page,
            paging_counter: self.paging_counter,
        }
    }
}
