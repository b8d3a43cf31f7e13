//! Cross-page selection engine for remotely paginated tables.
//!
//! Only one page of items is ever resident. The [`session::TableSession`]
//! keeps the selection consistent across page visits and resolves
//! "select the first N" requests incrementally as pages arrive.

pub mod auto_select;
pub mod item;
pub mod ledger;
pub mod pagination;
pub mod session;
pub mod source;

#[cfg(test)]
pub mod harness;

pub use auto_select::{AutoSelect, AutoSelectStatus, InvalidAutoSelectInput};
pub use item::{Item, Page};
pub use ledger::SelectionLedger;
pub use pagination::{FetchOutcome, FetchTicket, PaginationController, DEFAULT_PAGE_SIZE};
pub use session::{TableSession, TableView};
pub use source::{FetchError, MemorySource, PageResponse, PageSource};
