//! Test harness for table sessions backed by an in-memory dataset.
//!
//! `SessionHarness` pairs a `TableSession` with a `MemorySource` so tests
//! can drive page loads synchronously and inspect what the widget would
//! render, without threads or HTTP.

use crate::item::fixtures::Row;
use crate::pagination::FetchOutcome;
use crate::session::TableSession;
use crate::source::MemorySource;

/// Rows with ids `1..=n`, in dataset order.
pub fn dataset(n: u64) -> Vec<Row> {
    (1..=n).map(|id| Row { id }).collect()
}

pub struct SessionHarness {
    pub session: TableSession<Row>,
    pub source: MemorySource<Row>,
}

impl SessionHarness {
    pub fn new(items: u64, page_size: usize) -> Self {
        Self {
            session: TableSession::new(page_size),
            source: MemorySource::new(dataset(items)),
        }
    }

    /// Navigate to `page` and apply the fetch immediately.
    pub fn load(&mut self, page: usize) -> FetchOutcome {
        self.session.visit_page(page, &self.source)
    }

    /// Ids the widget would show as checked on the resident page.
    pub fn visible_ids(&self) -> Vec<u64> {
        self.session
            .view()
            .current_selection_for_display
            .iter()
            .map(|row| row.id)
            .collect()
    }
}
