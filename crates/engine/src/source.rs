//! The remote side of the table: something that can hand back one page.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::item::Item;

/// One page worth of items plus the dataset size the source reported.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse<I> {
    pub items: Vec<I>,
    pub total: usize,
}

/// Error type for page fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS, timeout
    Network(String),
    /// Non-success HTTP status with response body
    Http(u16, String),
    /// Response body did not have the expected shape
    Parse(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "Network error: {}", msg),
            FetchError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            FetchError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Fetches one page of the dataset.
///
/// `page` is 1-based. Implementations are blocking; callers that must not
/// block run them on a worker thread (see [`crate::pagination::FetchTicket`]).
pub trait PageSource<I: Item> {
    fn fetch_page(&self, page: usize, page_size: usize) -> Result<PageResponse<I>, FetchError>;
}

impl<I: Item, S: PageSource<I> + ?Sized> PageSource<I> for &S {
    fn fetch_page(&self, page: usize, page_size: usize) -> Result<PageResponse<I>, FetchError> {
        (**self).fetch_page(page, page_size)
    }
}

impl<I: Item, S: PageSource<I> + ?Sized> PageSource<I> for Arc<S> {
    fn fetch_page(&self, page: usize, page_size: usize) -> Result<PageResponse<I>, FetchError> {
        (**self).fetch_page(page, page_size)
    }
}

// ── In-memory source ────────────────────────────────────────────────

/// A fully materialized dataset served page by page.
///
/// Useful for demos and tests. Failures can be injected for specific pages.
#[derive(Debug)]
pub struct MemorySource<I> {
    items: Vec<I>,
    failing_pages: Mutex<Vec<usize>>,
    requests: AtomicUsize,
}

impl<I: Item> MemorySource<I> {
    pub fn new(items: Vec<I>) -> Self {
        Self {
            items,
            failing_pages: Mutex::new(Vec::new()),
            requests: AtomicUsize::new(0),
        }
    }

    /// Make every fetch of `page` fail with a 500 until [`Self::heal`] is called.
    pub fn fail_page(&self, page: usize) {
        if let Ok(mut pages) = self.failing_pages.lock() {
            pages.push(page);
        }
    }

    pub fn heal(&self) {
        if let Ok(mut pages) = self.failing_pages.lock() {
            pages.clear();
        }
    }

    /// Number of fetches served (including failed ones).
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<I: Item> PageSource<I> for MemorySource<I> {
    fn fetch_page(&self, page: usize, page_size: usize) -> Result<PageResponse<I>, FetchError> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        let failing = self
            .failing_pages
            .lock()
            .map(|pages| pages.contains(&page))
            .unwrap_or(false);
        if failing {
            return Err(FetchError::Http(500, format!("page {} unavailable", page)));
        }

        let start = page.saturating_sub(1).saturating_mul(page_size);
        let items = self
            .items
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        Ok(PageResponse {
            items,
            total: self.items.len(),
        })
    }
}
