//! Pagination types shared by all paged queries

use serde::Serialize;
use utoipa::ToSchema;

pub fn default_page_size() -> i64 {
    20
}

/// Page request parameters, zero-based page index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

impl PageRequest {
    pub fn of(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    pub fn limit(&self) -> i64 {
        self.size.max(1)
    }

    pub fn offset(&self) -> i64 {
        self.page.max(0) * self.limit()
    }
}

/// Page metadata echoed back to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    pub page_number: i64,
    pub page_size: i64,
}

/// A bounded slice of query results plus metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub content: Vec<T>,
    pub total_elements: i64,
    pub pageable: Pageable,
}

impl<T> Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(content: Vec<T>, total_elements: i64, request: &PageRequest) -> Self {
        Self {
            content,
            total_elements,
            pageable: Pageable {
                page_number: request.page,
                page_size: request.size,
            },
        }
    }
}
