use serde::{Deserialize, Serialize};

/// Position of one response inside a paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub current_page: u64,
    pub per_page: u64,
    pub total_count: u64,
}

impl PageDescriptor {
    pub const DEFAULT_PER_PAGE: u64 = 30;

    /// `current_page` and `per_page` are raised to 1 when given as 0.
    pub fn new(current_page: u64, per_page: u64, total_count: u64) -> Self {
        Self {
            current_page: current_page.max(1),
            per_page: per_page.max(1),
            total_count,
        }
    }

    /// `ceil(total_count / per_page)`, never less than 1.
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(self.per_page).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PageDescriptor::new(1, 30, 31).total_pages(), 2);
        assert_eq!(PageDescriptor::new(1, 30, 60).total_pages(), 2);
        assert_eq!(PageDescriptor::new(1, 30, 61).total_pages(), 3);
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let page = PageDescriptor::new(1, 30, 0);
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_zero_page_is_clamped() {
        let page = PageDescriptor::new(0, 0, 5);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.per_page, 1);
        assert_eq!(page.total_pages(), 5);
    }
}
