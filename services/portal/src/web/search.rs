//! services/portal/src/web/search.rs
//!
//! Debounced search for the admin tables. Each keystroke restarts the timer;
//! a newer term cancels both the pending timer and any request already in
//! flight, and only the newest term's result is ever delivered.

use spa_portal_core::ports::PortResult;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The result of one search run.
#[derive(Debug)]
pub struct SearchOutcome<T> {
    pub generation: u64,
    pub term: String,
    pub result: PortResult<T>,
}

/// Schedules searches. Dropping it cancels whatever is pending.
pub struct SearchDebouncer<T> {
    delay: Duration,
    latest: Arc<AtomicU64>,
    current: Option<CancellationToken>,
    tx: mpsc::UnboundedSender<SearchOutcome<T>>,
}

/// The receiving half: yields outcomes of the newest search only.
pub struct SearchResults<T> {
    latest: Arc<AtomicU64>,
    rx: mpsc::UnboundedReceiver<SearchOutcome<T>>,
}

impl<T: Send + 'static> SearchDebouncer<T> {
    pub fn new(delay: Duration) -> (Self, SearchResults<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let latest = Arc::new(AtomicU64::new(0));
        let debouncer = Self {
            delay,
            latest: Arc::clone(&latest),
            current: None,
            tx,
        };
        (debouncer, SearchResults { latest, rx })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Starts the timer for `term`. When it fires, `fetch(term)` runs unless a
    /// newer `submit` or `cancel` came first. Returns the generation number.
    pub fn submit<F, Fut>(&mut self, term: impl Into<String>, fetch: F) -> u64
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = PortResult<T>> + Send + 'static,
    {
        self.cancel();

        let term = term.into();
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let delay = self.delay;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Search '{}' superseded before it was sent", term);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Search '{}' abandoned in flight", term);
                }
                result = fetch(term.clone()) => {
                    // The receiver may be gone; nothing is waiting then.
                    let _ = tx.send(SearchOutcome { generation, term, result });
                }
            }
        });

        generation
    }

    /// Drops the pending search, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

impl<T> Drop for SearchDebouncer<T> {
    fn drop(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

impl<T> SearchResults<T> {
    /// Waits for the next outcome that belongs to the newest search. Returns
    /// `None` once the debouncer is dropped and nothing is left to deliver.
    pub async fn next(&mut self) -> Option<SearchOutcome<T>> {
        loop {
            let outcome = self.rx.recv().await?;
            if outcome.generation == self.latest.load(Ordering::SeqCst) {
                return Some(outcome);
            }
            debug!("Dropping stale result for '{}'", outcome.term);
        }
    }
}
