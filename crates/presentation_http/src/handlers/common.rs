//! Shared request and response shapes for paged listings

use domain::{DomainError, PageRequest, PaginatedResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

const fn default_page() -> u32 {
    1
}

const fn default_page_size() -> u32 {
    20
}

/// `?page=&pageSize=&sort=` query parameters
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub page: u32,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub page_size: u32,

    /// Sort descriptor such as `Name,-CreatedOn`
    #[serde(default)]
    pub sort: Option<String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            sort: None,
        }
    }
}

impl PageQuery {
    pub fn page_request(&self) -> Result<PageRequest, DomainError> {
        PageRequest::new(self.page, self.page_size, MAX_PAGE_SIZE)
    }

    /// Sort descriptor, empty when absent
    pub fn sort_descriptor(&self) -> &str {
        self.sort.as_deref().unwrap_or_default()
    }
}

/// One page of results plus totals
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> From<PaginatedResult<T>> for PageResponse<T> {
    fn from(page: PaginatedResult<T>) -> Self {
        Self {
            current_page: page.current_page(),
            page_size: page.page_size(),
            total_count: page.total_count(),
            total_pages: page.total_pages(),
            has_previous_page: page.has_previous_page(),
            has_next_page: page.has_next_page(),
            data: page.into_data(),
        }
    }
}
