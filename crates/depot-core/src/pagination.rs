//! # Pagination
//!
//! 1-indexed `page`/`limit` paging for the history views.
//!
//! ```text
//! ?page=2&limit=10 over 25 rows
//!
//!   rows:  [0 ........ 9][10 ....... 19][20 ... 24]
//!           page 1         page 2 ◄──     page 3
//!
//!   offset = (page - 1) * limit = 10
//!   response: { data: rows[10..20], total: 25, page: 2, limit: 10 }
//! ```
//!
//! Query strings are parsed leniently: anything that is not a positive
//! integer falls back to the default, and `limit` is capped.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// A normalized page request. `page >= 1`, `1 <= limit <= MAX_PAGE_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Builds a request, clamping out-of-range values.
    pub fn new(page: u32, limit: u32) -> Self {
        PageRequest {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Parses raw query-string values.
    ///
    /// ```rust
    /// use depot_core::PageRequest;
    ///
    /// let req = PageRequest::from_raw(Some("2"), Some("10"));
    /// assert_eq!((req.page(), req.limit(), req.offset()), (2, 10, 10));
    ///
    /// let req = PageRequest::from_raw(Some("abc"), Some("-5"));
    /// assert_eq!((req.page(), req.limit()), (1, 10));
    /// ```
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(limit).unwrap_or(DEFAULT_PAGE_LIMIT);
        PageRequest::new(page, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip, as SQLite wants it.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(DEFAULT_PAGE, DEFAULT_PAGE_LIMIT)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        Page {
            data,
            total,
            page: request.page(),
            limit: request.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::from_raw(None, None);
        assert_eq!(req, PageRequest::default());
        assert_eq!((req.page(), req.limit(), req.offset()), (1, 10, 0));
    }

    #[test]
    fn test_garbage_falls_back() {
        let req = PageRequest::from_raw(Some("0"), Some("ten"));
        assert_eq!((req.page(), req.limit()), (1, 10));
        let req = PageRequest::from_raw(Some("1.5"), Some(""));
        assert_eq!((req.page(), req.limit()), (1, 10));
    }

    #[test]
    fn test_limit_capped() {
        let req = PageRequest::from_raw(Some("3"), Some("5000"));
        assert_eq!(req.limit(), MAX_PAGE_LIMIT);
        assert_eq!(req.offset(), 200);
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new((10..20).collect::<Vec<i32>>(), 25, PageRequest::new(2, 10));
        assert_eq!(page.data.len(), 10);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total"], 25);
        assert_eq!(json["page"], 2);
        assert_eq!(json["limit"], 10);
        assert_eq!(json["data"][0], 10);
    }
}
