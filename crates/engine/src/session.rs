//! One table session: the pagination controller, selection ledger and
//! auto-select engine wired together behind the table widget's events.
//!
//! A session is owned by exactly one actor (the UI loop). Fetches may run
//! elsewhere, but their results always come back through
//! [`TableSession::on_fetch_complete`].

use serde::Serialize;

use crate::auto_select::{parse_target, AutoSelect, AutoSelectStatus, InvalidAutoSelectInput};
use crate::item::Item;
use crate::ledger::SelectionLedger;
use crate::pagination::{FetchOutcome, FetchTicket, PaginationController};
use crate::source::{FetchError, PageResponse, PageSource};

/// Everything the table widget needs to render the current state.
#[derive(Debug, Clone, Serialize)]
pub struct TableView<'a, I> {
    pub items: &'a [I],
    pub loading: bool,
    pub total: usize,
    pub page_size: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub current_selection_for_display: Vec<&'a I>,
    pub error: Option<&'a str>,
    pub selected_count: usize,
}

#[derive(Debug)]
pub struct TableSession<I: Item> {
    pager: PaginationController<I>,
    ledger: SelectionLedger<I::Id>,
    auto: AutoSelect,
}

impl<I: Item> TableSession<I> {
    pub fn new(page_size: usize) -> Self {
        Self::with_pager(PaginationController::new(page_size))
    }

    pub fn with_pager(pager: PaginationController<I>) -> Self {
        Self {
            pager,
            ledger: SelectionLedger::new(),
            auto: AutoSelect::new(),
        }
    }

    pub fn pager(&self) -> &PaginationController<I> {
        &self.pager
    }

    pub fn ledger(&self) -> &SelectionLedger<I::Id> {
        &self.ledger
    }

    pub fn auto_select(&self) -> AutoSelectStatus {
        self.auto.status()
    }

    /// True when visiting `page` or any later page cannot add to the
    /// selection. Always true while no target is active.
    pub fn auto_select_exhausted_at(&self, page: usize) -> bool {
        self.auto.is_exhausted_at(page, self.pager.page_size())
    }

    /// Initial fetch when the table first appears.
    pub fn mount(&mut self) -> FetchTicket {
        self.pager
            .go_to_page(1)
            .unwrap_or_else(|| self.pager.refresh())
    }

    pub fn on_page_requested(&mut self, page: usize) -> Option<FetchTicket> {
        self.pager.go_to_page(page)
    }

    pub fn refresh(&mut self) -> FetchTicket {
        self.pager.refresh()
    }

    /// Feed back the result of a fetch. When an applied page arrives while
    /// a target is active, the target is extended over it.
    pub fn on_fetch_complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<PageResponse<I>, FetchError>,
    ) -> FetchOutcome {
        let outcome = self.pager.complete(ticket, result);
        if outcome == FetchOutcome::Applied {
            self.extend_auto_selection();
        }
        outcome
    }

    /// Issue, fetch and apply a page synchronously.
    pub fn visit_page<S: PageSource<I>>(&mut self, page: usize, source: &S) -> FetchOutcome {
        let outcome = self.pager.load_with(page, source);
        if outcome == FetchOutcome::Applied {
            self.extend_auto_selection();
        }
        outcome
    }

    /// The widget reports the full set of rows now checked on the page.
    pub fn on_selection_toggled(&mut self, checked: &[I]) {
        self.ledger
            .apply_user_selection_change(self.pager.items(), checked);
    }

    pub fn toggle_row(&mut self, id: &I::Id) {
        self.ledger.toggle(self.pager.items(), id);
    }

    pub fn set_page_checked(&mut self, checked: bool) {
        self.ledger.set_page_checked(self.pager.items(), checked);
    }

    /// Handle a "select first N rows" submission. Invalid input leaves the
    /// session untouched.
    pub fn submit_auto_select(&mut self, value: &str) -> Result<(), InvalidAutoSelectInput> {
        let n = parse_target(value)?;
        self.auto.request(&mut self.ledger, n);
        self.extend_auto_selection();
        Ok(())
    }

    fn extend_auto_selection(&mut self) {
        let page = match self.pager.resident_page() {
            Some(page) => page,
            None => return,
        };
        let resident = self.pager.items();
        if resident.is_empty() {
            return;
        }
        self.auto
            .on_page_visited(&mut self.ledger, page, self.pager.page_size(), resident);
    }

    pub fn view(&self) -> TableView<'_, I> {
        let items = self.pager.items();
        TableView {
            items,
            loading: self.pager.is_loading(),
            total: self.pager.total(),
            page_size: self.pager.page_size(),
            current_page: self.pager.current_page(),
            total_pages: self.pager.total_pages(),
            current_selection_for_display: self.ledger.visible_selection(items),
            error: self.pager.last_error(),
            selected_count: self.ledger.selected_count(),
        }
    }

    /// Selected ids in ascending order.
    pub fn selected_ids(&self) -> Vec<I::Id> {
        let mut ids: Vec<I::Id> = self.ledger.selected().iter().cloned().collect();
        ids.sort();
        ids
    }
}
