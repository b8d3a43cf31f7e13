//! Pagination controller: current page, the single resident page, and
//! stale-response suppression.
//!
//! Every page request hands out a [`FetchTicket`] tagged with a generation.
//! Issuing a new ticket bumps the generation, so any ticket still in flight
//! becomes superseded. Results are only applied when their ticket is the
//! latest one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::item::{page_count, Item};
use crate::source::{FetchError, PageResponse, PageSource};

pub const DEFAULT_PAGE_SIZE: usize = 12;
/// Library fallback; applications set their own with
/// [`PaginationController::with_error_message`].
pub const DEFAULT_ERROR_MESSAGE: &str = "Failed to load items";

/// Handle for one outstanding page fetch.
///
/// Tickets are `Send` so a worker thread can carry one alongside the fetch.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    page: usize,
    page_size: usize,
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl FetchTicket {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once a newer page request has been issued by the controller.
    ///
    /// Workers should check this before starting network I/O.
    pub fn is_superseded(&self) -> bool {
        self.latest.load(Ordering::Acquire) != self.generation
    }

    /// Run the fetch this ticket describes, unless it was already superseded.
    pub fn fetch<I: Item, S: PageSource<I>>(
        &self,
        source: &S,
    ) -> Option<Result<PageResponse<I>, FetchError>> {
        if self.is_superseded() {
            log::debug!("skipping fetch for superseded page {}", self.page);
            return None;
        }
        Some(source.fetch_page(self.page, self.page_size))
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page became the resident set.
    Applied,
    /// The fetch failed; the previous resident set is kept.
    Failed(FetchError),
    /// A newer request superseded this one; nothing changed.
    Stale,
}

#[derive(Debug)]
pub struct PaginationController<I> {
    current_page: usize,
    page_size: usize,
    items: Vec<I>,
    resident_page: Option<usize>,
    total: usize,
    loading: bool,
    last_error: Option<String>,
    error_message: String,
    issued: u64,
    latest: Arc<AtomicU64>,
}

impl<I: Item> PaginationController<I> {
    pub fn new(page_size: usize) -> Self {
        let page_size = if page_size == 0 {
            log::warn!("page size 0 requested, using {}", DEFAULT_PAGE_SIZE);
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Self {
            current_page: 1,
            page_size,
            items: Vec::new(),
            resident_page: None,
            total: 0,
            loading: false,
            last_error: None,
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            issued: 0,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Override the user-facing message shown when a fetch fails.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The resident set: items of the page that was last applied.
    pub fn items(&self) -> &[I] {
        &self.items
    }

    /// Page number the resident items belong to. Differs from
    /// [`Self::current_page`] while a fetch is in flight or after it failed.
    pub fn resident_page(&self) -> Option<usize> {
        self.resident_page
    }

    /// Dataset size; 0 until a fetch reported one.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn total_pages(&self) -> usize {
        page_count(self.total, self.page_size)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Navigate to page `n` (1-based; 0 is treated as 1).
    ///
    /// Returns `None` when `n` is already current and either resident or in
    /// flight, since there is nothing new to fetch.
    pub fn go_to_page(&mut self, n: usize) -> Option<FetchTicket> {
        let n = n.max(1);
        if n == self.current_page && (self.loading || self.resident_page == Some(n)) {
            return None;
        }
        self.current_page = n;
        Some(self.issue())
    }

    /// Re-fetch the current page unconditionally.
    pub fn refresh(&mut self) -> FetchTicket {
        self.issue()
    }

    fn issue(&mut self) -> FetchTicket {
        self.issued += 1;
        self.latest.store(self.issued, Ordering::Release);
        self.loading = true;
        self.last_error = None;
        log::debug!("fetch issued: page {} (generation {})", self.current_page, self.issued);
        FetchTicket {
            page: self.current_page,
            page_size: self.page_size,
            generation: self.issued,
            latest: Arc::clone(&self.latest),
        }
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.issued && Arc::ptr_eq(&ticket.latest, &self.latest)
    }

    /// Apply the result of a fetch, unless its ticket was superseded.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<PageResponse<I>, FetchError>,
    ) -> FetchOutcome {
        if !self.is_current(ticket) {
            log::debug!(
                "discarding stale response for page {} (generation {}, latest {})",
                ticket.page,
                ticket.generation,
                self.issued
            );
            return FetchOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(response) => {
                self.items = response.items;
                self.resident_page = Some(ticket.page);
                if self.total == 0 {
                    self.total = response.total;
                }
                self.last_error = None;
                FetchOutcome::Applied
            }
            Err(e) => {
                log::warn!("fetch for page {} failed: {}", ticket.page, e);
                self.last_error = Some(self.error_message.clone());
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Issue, fetch and complete in one blocking step. Always hits the source.
    pub fn load_with<S: PageSource<I>>(&mut self, page: usize, source: &S) -> FetchOutcome {
        let ticket = self.go_to_page(page).unwrap_or_else(|| self.refresh());
        let result = source.fetch_page(ticket.page, ticket.page_size);
        self.complete(&ticket, result)
    }
}
