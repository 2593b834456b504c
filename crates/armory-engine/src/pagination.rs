//! Page slicing for list endpoints.

use armory_core::{Error, Result};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl PageRequest {
    /// Validate a 1-based page number and a page size in `1..=100`.
    pub fn new(page: i64, page_size: i64) -> Result<Self> {
        if page < 1 {
            return Err(Error::InvalidInput(
                "Page number must be a valid number greater than 0".to_string(),
            ));
        }
        if page_size < 1 || page_size > MAX_PAGE_SIZE as i64 {
            return Err(Error::InvalidInput(format!(
                "Page size must be a valid number between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(Self {
            page: page as usize,
            page_size: page_size as usize,
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Slice one page out of `items`.
///
/// A page past the end is clamped to the last page; an empty list yields an
/// empty first page.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Paginated<T> {
    let total = items.len();
    let total_pages = total.div_ceil(request.page_size);
    let page = request.page.min(total_pages.max(1));

    let start = ((page - 1) * request.page_size).min(total);
    let end = (start + request.page_size).min(total);

    Paginated {
        data: items[start..end].to_vec(),
        pagination: Pagination {
            page,
            page_size: request.page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        },
    }
}
