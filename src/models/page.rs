//! Pagination metadata for the currently loaded slice of applicants.

/// Cursor and server-reported totals for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

impl Page {
    pub fn new(items_per_page: u32) -> Self {
        Self {
            current_page: 1,
            items_per_page: items_per_page.max(1),
            total_pages: 0,
            total_count: 0,
        }
    }

    /// Page count implied by a total and a page size.
    pub fn pages_for(total_count: u64, items_per_page: u32) -> u32 {
        let size = u64::from(items_per_page.max(1));
        u32::try_from(total_count.div_ceil(size)).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(6)
    }
}

/// A page of records with the metadata the server reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub page: Page,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_for() {
        assert_eq!(Page::pages_for(10, 6), 2);
        assert_eq!(Page::pages_for(12, 6), 2);
        assert_eq!(Page::pages_for(0, 6), 0);
        assert_eq!(Page::pages_for(5, 0), 5);
    }

    #[test]
    fn test_navigation_flags() {
        let page = Page {
            current_page: 2,
            items_per_page: 6,
            total_pages: 2,
            total_count: 10,
        };
        assert!(page.has_previous());
        assert!(!page.has_next());
        assert!(!Page::new(6).has_previous());
    }
}
