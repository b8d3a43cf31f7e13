//! Items and pages as the engine sees them.
//!
//! The engine never looks past an item's identifier. Display fields belong
//! to whatever renders the table.

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;

/// A record with a stable, dataset-wide unique identifier.
pub trait Item: Clone {
    type Id: Clone + Eq + Hash + Ord + Debug;

    fn id(&self) -> Self::Id;
}

/// One page of items in dataset order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<I> {
    /// 1-based page number.
    pub number: usize,
    pub items: Vec<I>,
}

impl<I: Item> Page<I> {
    pub fn new(number: usize, items: Vec<I>) -> Self {
        Self { number, items }
    }
}

/// Number of pages needed for `total` items (at least one).
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}


#[cfg(test)]
mod tests {
    use super::fixtures::page_rows;
    use super::*;

    #[test]
    fn test_page_new() {
        let page = Page::new(2, page_rows(2, 2));
        assert_eq!(page.number, 2);
        assert_eq!(page.items[0].id, 3);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 12), 1);
        assert_eq!(page_count(12, 12), 1);
        assert_eq!(page_count(13, 12), 2);
        assert_eq!(page_count(127_000, 12), 10_584);
        assert_eq!(page_count(10, 0), 1);
    }
}
