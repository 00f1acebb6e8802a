//! Pagination for competition listings
//!
//! Pages are 0-indexed, matching the data service's `page`/`size` query
//! parameters.

use serde::{Deserialize, Serialize};

/// Default page size for competition listings
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on a requested page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (0-indexed)
    pub page: u32,
    /// Sanitized page size
    pub size: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Index of the first item on this page
    pub offset: usize,
}

/// Calculate pagination metadata from total results and requested page
///
/// Page size is clamped to `1..=MAX_PAGE_SIZE`. Out-of-range pages are not
/// clamped: they yield an empty page, the way the service behaves.
///
/// # Examples
/// ```
/// use bmj_common::pagination::calculate_pagination;
///
/// // 25 results at 10 per page = 3 pages
/// let p = calculate_pagination(25, 2, 10);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 20);
/// ```
pub fn calculate_pagination(total_results: usize, requested_page: u32, size: u32) -> Pagination {
    let size = size.clamp(1, MAX_PAGE_SIZE);
    let total_pages = total_results.div_ceil(size as usize) as u32;
    let offset = requested_page as usize * size as usize;

    Pagination {
        page: requested_page,
        size,
        total_pages,
        offset,
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Page number (0-indexed)
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Slice `items` according to `pagination`
    pub fn from_items(items: Vec<T>, pagination: Pagination) -> Self {
        let total_elements = items.len() as u64;
        let content = items
            .into_iter()
            .skip(pagination.offset)
            .take(pagination.size as usize)
            .collect();

        Self {
            content,
            number: pagination.page,
            size: pagination.size,
            total_elements,
            total_pages: pagination.total_pages,
        }
    }

    pub fn is_last(&self) -> bool {
        self.number + 1 >= self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(25, 1, 10);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 10);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 0, 10);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_clamps_size() {
        assert_eq!(calculate_pagination(5, 0, 0).size, 1);
        assert_eq!(calculate_pagination(5, 0, 1000).size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_from_items() {
        let items: Vec<u32> = (0..25).collect();
        let page = Page::from_items(items, calculate_pagination(25, 2, 10));
        assert_eq!(page.content, vec![20, 21, 22, 23, 24]);
        assert_eq!(page.total_elements, 25);
        assert!(page.is_last());
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items: Vec<u32> = (0..5).collect();
        let page = Page::from_items(items, calculate_pagination(5, 4, 10));
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_page_wire_format() {
        let page = Page::from_items(vec!["a"], calculate_pagination(1, 0, 10));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["number"], 0);
    }
}
