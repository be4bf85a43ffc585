//! Pagination value objects

use serde::Serialize;

use crate::errors::DomainError;

/// One page of results plus the totals needed to navigate the rest
///
/// `total_pages` is derived from `total_count` and `page_size` at
/// construction; the previous/next flags are computed on demand.
///
/// Serialized wire shape:
/// `{ "data": [...], "currentPage", "pageSize", "totalPages", "totalCount" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    data: Vec<T>,
    current_page: u32,
    page_size: u32,
    total_pages: u64,
    total_count: u64,
}

impl<T> PaginatedResult<T> {
    /// Build a page; `current_page` is 1-based
    pub fn new(data: Vec<T>, total_count: u64, current_page: u32, page_size: u32) -> Self {
        Self {
            data,
            current_page,
            page_size,
            total_pages: total_pages(total_count, page_size),
            total_count,
        }
    }

    /// Page with no data and no matches
    pub fn empty(current_page: u32, page_size: u32) -> Self {
        Self::new(Vec::new(), 0, current_page, page_size)
    }

    /// Items of this page, in page-local order
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    pub const fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    pub const fn has_next_page(&self) -> bool {
        (self.current_page as u64) < self.total_pages
    }

    /// Transform every item while keeping the paging totals
    pub fn map<U, F>(self, f: F) -> PaginatedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResult {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_count: self.total_count,
        }
    }
}

/// `ceil(total_count / page_size)`, zero for a zero page size
pub const fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        0
    } else {
        total_count.div_ceil(page_size as u64)
    }
}

/// Validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate a page request (`page >= 1`, `1 <= page_size <= max_page_size`)
    pub fn new(page: u32, page_size: u32, max_page_size: u32) -> Result<Self, DomainError> {
        if page < 1 {
            return Err(DomainError::ValidationError(
                "page must be at least 1".to_string(),
            ));
        }
        if page_size < 1 || page_size > max_page_size {
            return Err(DomainError::ValidationError(format!(
                "page size must be between 1 and {max_page_size}"
            )));
        }
        Ok(Self { page, page_size })
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip before this page
    pub const fn offset(&self) -> u64 {
        page_offset(self.page, self.page_size)
    }
}

/// `(page - 1) * page_size`, saturating at zero for page 0
pub const fn page_offset(page: u32, page_size: u32) -> u64 {
    (page.saturating_sub(1) as u64) * (page_size as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_page_has_both_neighbours() {
        let page = PaginatedResult::new(vec![4, 5, 6], 10, 2, 3);
        assert_eq!(page.data().len(), 3);
        assert_eq!(page.total_pages(), 4);
        assert!(page.has_previous_page());
        assert!(page.has_next_page());
    }

    #[test]
    fn last_page_has_no_next() {
        let page = PaginatedResult::new(vec![10], 10, 4, 3);
        assert_eq!(page.total_pages(), 4);
        assert!(page.has_previous_page());
        assert!(!page.has_next_page());
    }

    #[test]
    fn first_page_has_no_previous() {
        let page = PaginatedResult::new(vec![1, 2, 3], 10, 1, 3);
        assert!(!page.has_previous_page());
        assert!(page.has_next_page());
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page: PaginatedResult<i32> = PaginatedResult::empty(1, 20);
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next_page());
        assert!(!page.has_previous_page());
    }

    #[test]
    fn zero_page_size_does_not_divide() {
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn map_keeps_totals() {
        let page = PaginatedResult::new(vec![1, 2], 5, 1, 2).map(|n| n * 10);
        assert_eq!(page.data(), [10, 20]);
        assert_eq!(page.total_count(), 5);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn serializes_wire_shape() {
        let page = PaginatedResult::new(vec!["a"], 1, 1, 10);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": ["a"],
                "currentPage": 1,
                "pageSize": 10,
                "totalPages": 1,
                "totalCount": 1
            })
        );
    }

    #[test]
    fn page_request_validates_bounds() {
        assert!(PageRequest::new(0, 10, 100).is_err());
        assert!(PageRequest::new(1, 0, 100).is_err());
        assert!(PageRequest::new(1, 101, 100).is_err());
        let request = PageRequest::new(3, 25, 100).unwrap();
        assert_eq!(request.offset(), 50);
    }

    #[test]
    fn offset_saturates_for_page_zero() {
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(2, 3), 3);
    }
}
