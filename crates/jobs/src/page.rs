//! Pagination math shared by every paged listing.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Raw paging input as received from callers (may be out of range).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// `page < 1` becomes 1 and `page_size < 1` becomes 10.
    pub fn normalized(self) -> Page {
        let number = if self.page < 1 { DEFAULT_PAGE } else { self.page as u64 };
        let size = if self.page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size as u64
        };
        Page { number, size }
    }
}

/// A validated page (`number >= 1`, `size >= 1`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

impl Page {
    /// Number of documents to skip.
    pub fn offset(&self) -> u64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

/// One page of results plus totals over the fully filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub page: u64,
    pub total_page: u64,
}

impl<T> Paginated<T> {
    pub fn new(docs: Vec<T>, total_docs: u64, page: Page) -> Self {
        Self {
            docs,
            total_docs,
            page: page.number,
            total_page: total_pages(total_docs, page.size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            docs: self.docs.into_iter().map(f).collect(),
            total_docs: self.total_docs,
            page: self.page,
            total_page: self.total_page,
        }
    }
}

/// `ceil(total_docs / page_size)`.
pub fn total_pages(total_docs: u64, page_size: u64) -> u64 {
    total_docs.div_ceil(page_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn out_of_range_input_is_defaulted() {
        assert_eq!(PageRequest::new(0, 0).normalized(), Page { number: 1, size: 10 });
        assert_eq!(PageRequest::new(-3, -1).normalized(), Page { number: 1, size: 10 });
        assert_eq!(PageRequest::new(2, 25).normalized(), Page { number: 2, size: 25 });
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    proptest! {
        #[test]
        fn total_page_is_ceiling(total in 0u64..10_000, size in 1i64..500) {
            let page = PageRequest::new(1, size).normalized();
            let result = Paginated::<()>::new(vec![], total, page);
            let size = size as u64;
            prop_assert!(result.total_page * size >= total);
            prop_assert!(result.total_page == 0 || (result.total_page - 1) * size < total);
        }

        #[test]
        fn offset_skips_previous_pages(page in 1i64..1000, size in 1i64..1000) {
            let p = PageRequest::new(page, size).normalized();
            prop_assert_eq!(p.offset(), ((page - 1) * size) as u64);
        }
    }
}
