//! Background page fetches for the interactive table.
//!
//! Each ticket gets a short-lived worker thread. Workers whose ticket was
//! superseded before they started never touch the network; results that
//! come back late are dropped by the session when applied.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use pagesel_engine::{FetchError, FetchTicket, Item, PageResponse, PageSource};

pub(crate) type Completed<I> = (FetchTicket, Result<PageResponse<I>, FetchError>);

pub(crate) struct Fetcher<I, S> {
    source: Arc<S>,
    tx: Sender<Completed<I>>,
    rx: Receiver<Completed<I>>,
}

impl<I, S> Fetcher<I, S>
where
    I: Item + Send + 'static,
    S: PageSource<I> + Send + Sync + 'static,
{
    pub(crate) fn new(source: S) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source: Arc::new(source),
            tx,
            rx,
        }
    }

    pub(crate) fn spawn(&self, ticket: FetchTicket) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        log::debug!(
            "spawning fetch: page {} (generation {})",
            ticket.page(),
            ticket.generation()
        );
        thread::spawn(move || {
            if let Some(result) = ticket.fetch(&source) {
                // Receiver gone means the UI already quit.
                let _ = tx.send((ticket, result));
            }
        });
    }

    /// Completed fetches, without blocking.
    pub(crate) fn drain(&self) -> Vec<Completed<I>> {
        self.rx.try_iter().collect()
    }

    #[cfg(test)]
    pub(crate) fn recv_timeout(&self, timeout: std::time::Duration) -> Option<Completed<I>> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesel_engine::{FetchOutcome, MemorySource, TableSession};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(u64);

    impl Item for Row {
        type Id = u64;

        fn id(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn superseded_ticket_never_reports() {
        let fetcher = Fetcher::new(MemorySource::new((1..=50).map(Row).collect()));
        let mut session = TableSession::<Row>::new(10);

        let two = session.on_page_requested(2).unwrap();
        let three = session.on_page_requested(3).unwrap();
        assert!(three.generation() > two.generation());
        fetcher.spawn(two);
        fetcher.spawn(three);

        let (ticket, result) = fetcher.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(ticket.page(), 3);
        assert_eq!(session.on_fetch_complete(&ticket, result), FetchOutcome::Applied);
        assert_eq!(session.view().items[0], Row(21));

        assert!(fetcher.recv_timeout(Duration::from_millis(200)).is_none());
        assert!(fetcher.drain().is_empty());
    }
}
