//! Offset pagination primitives.

use serde::{Deserialize, Serialize};

use crate::query::{DEFAULT_LIMIT, DEFAULT_PAGE};

/// A 1-based page of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageWindow {
    page: u32,
    limit: u32,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

impl PageWindow {
    /// Create a window. Zero values fall back to the defaults.
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip: `(page - 1) * limit`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// `ceil(total / limit)`; zero when there are no matches.
#[must_use]
pub const fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit as u64)
}

/// Metadata describing one page of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_products: u64,
}

impl PageInfo {
    #[must_use]
    pub const fn new(window: PageWindow, total_products: u64) -> Self {
        Self {
            current_page: window.page(),
            total_pages: total_pages(total_products, window.limit()),
            total_products,
        }
    }

    /// Whether a page after this one exists.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        (self.current_page as u64) < self.total_pages
    }
}

/// A page of items plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, info: PageInfo) -> Self {
        Self { items, info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageWindow::new(1, 12).offset(), 0);
        assert_eq!(PageWindow::new(3, 12).offset(), 24);
        assert_eq!(PageWindow::new(0, 0), PageWindow::default());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(25, 12), 3);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_has_more() {
        let info = PageInfo::new(PageWindow::new(2, 12), 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_more());
        assert!(!PageInfo::new(PageWindow::new(3, 12), 25).has_more());
        assert!(!PageInfo::new(PageWindow::new(1, 12), 0).has_more());
    }
}
