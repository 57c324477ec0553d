use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::QuoteError;
use crate::quote::{Quote, QuoteBook};
use crate::remote::{RemoteClient, RemoteSource};

/// Where the engine is in its fetch/reconcile cycle.
///
/// `Failed` is a resting state: it records that the last cycle did not
/// complete, and schedules exactly like `Idle`. The in-flight handle is
/// what actually gates new cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Fetching,
    Reconciling,
    Failed,
}

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub replaced: bool,
    pub local_count: usize,
    pub remote_count: usize,
}

impl SyncOutcome {
    pub fn message(&self) -> String {
        if self.replaced {
            format!("Synced: replaced local quotes with {} from server", self.remote_count)
        } else {
            format!("Already in sync ({} quotes)", self.local_count)
        }
    }
}

/// Apply the overwrite policy: a count mismatch means the server wins and
/// the whole local collection is replaced. Equal counts are treated as
/// already in sync even when contents differ; the counts are logged so the
/// blind spot is at least diagnosable.
pub fn reconcile(book: &mut QuoteBook, remote: Vec<Quote>) -> SyncOutcome {
    let local_count = book.len();
    let remote_count = remote.len();
    let replaced = local_count != remote_count;

    if replaced {
        book.replace_all(remote);
    }

    SyncOutcome {
        replaced,
        local_count,
        remote_count,
    }
}

/// Keeps the quote book eventually consistent with the remote collection.
///
/// One fetch may be outstanding at a time; the engine owns its handle and
/// drops (never queues) start requests that arrive while it is in flight.
/// The caller persists the book after a cycle that replaced it.
pub struct SyncEngine<R = RemoteClient> {
    remote: R,
    phase: SyncPhase,
    fetch_task: Option<JoinHandle<Result<Vec<Quote>, QuoteError>>>,
}

impl<R: RemoteSource + Clone + Send + 'static> SyncEngine<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            phase: SyncPhase::Idle,
            fetch_task: None,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn in_flight(&self) -> bool {
        self.fetch_task.is_some()
    }

    /// Begin a fetch unless one is already outstanding.
    ///
    /// Returns whether a new cycle started; a refused start is a dropped
    /// timer tick, not a queued one.
    pub fn start(&mut self) -> bool {
        if self.fetch_task.is_some() {
            return false;
        }

        let remote = self.remote.clone();
        self.phase = SyncPhase::Fetching;
        self.fetch_task = Some(tokio::spawn(async move { remote.fetch_quotes().await }));
        true
    }

    /// Collect the fetch result once it has finished and apply the policy.
    ///
    /// Returns `None` while nothing is outstanding or the fetch is still
    /// running. Call from the event loop tick.
    pub async fn poll(&mut self, book: &mut QuoteBook) -> Option<Result<SyncOutcome, QuoteError>> {
        let finished = self
            .fetch_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return None;
        }

        let task = self.fetch_task.take()?;
        let fetched = match task.await {
            Ok(result) => result,
            Err(err) => {
                self.phase = SyncPhase::Failed;
                warn!(error = %err, "sync fetch task did not complete");
                return Some(Err(QuoteError::Worker(err.to_string())));
            }
        };

        Some(self.apply(book, fetched))
    }

    /// Run one full cycle inline. Used by the CLI, where nothing else can
    /// overlap the fetch.
    pub async fn sync_once(&mut self, book: &mut QuoteBook) -> Result<SyncOutcome, QuoteError> {
        self.phase = SyncPhase::Fetching;
        let fetched = self.remote.fetch_quotes().await;
        self.apply(book, fetched)
    }

    /// Send one quote to the server in the background. The local copy of
    /// the quote stays in place whatever the server answers.
    pub fn post(&self, quote: Quote) -> JoinHandle<Result<Quote, QuoteError>> {
        let remote = self.remote.clone();
        tokio::spawn(async move { remote.post_quote(&quote).await })
    }

    fn apply(
        &mut self,
        book: &mut QuoteBook,
        fetched: Result<Vec<Quote>, QuoteError>,
    ) -> Result<SyncOutcome, QuoteError> {
        match fetched {
            Ok(remote_quotes) => {
                self.phase = SyncPhase::Reconciling;
                let outcome = reconcile(book, remote_quotes);
                info!(
                    local = outcome.local_count,
                    remote = outcome.remote_count,
                    replaced = outcome.replaced,
                    "sync cycle complete"
                );
                self.phase = SyncPhase::Idle;
                Ok(outcome)
            }
            Err(err) => {
                warn!(error = %err, "sync fetch failed");
                self.phase = SyncPhase::Failed;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    #[derive(Clone)]
    struct FakeRemote {
        quotes: Arc<Vec<Quote>>,
        fail: bool,
    }

    impl FakeRemote {
        fn with_quotes(quotes: Vec<Quote>) -> Self {
            Self {
                quotes: Arc::new(quotes),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                quotes: Arc::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl RemoteSource for FakeRemote {
        async fn fetch_quotes(&self) -> Result<Vec<Quote>, QuoteError> {
            if self.fail {
                return Err(QuoteError::Status(503));
            }
            Ok(self.quotes.as_ref().clone())
        }

        async fn post_quote(&self, quote: &Quote) -> Result<Quote, QuoteError> {
            if self.fail {
                return Err(QuoteError::Status(503));
            }
            Ok(quote.clone())
        }
    }

    fn server_set(count: usize) -> Vec<Quote> {
        (0..count)
            .map(|i| Quote::new(format!("Server quote {}", i), "Server"))
            .collect()
    }

    #[test]
    fn test_reconcile_equal_counts_is_noop() {
        let mut book = QuoteBook::seeded();
        let before: Vec<Quote> = book.all().to_vec();

        // Same cardinality, entirely different contents: still "in sync".
        let outcome = reconcile(&mut book, server_set(3));

        assert!(!outcome.replaced);
        assert_eq!(outcome.local_count, 3);
        assert_eq!(outcome.remote_count, 3);
        assert_eq!(book.all(), before.as_slice());
    }

    #[test]
    fn test_reconcile_count_mismatch_overwrites() {
        let mut book = QuoteBook::seeded();
        let remote = server_set(5);

        let outcome = reconcile(&mut book, remote.clone());

        assert!(outcome.replaced);
        assert_eq!(book.len(), 5);
        assert_eq!(book.all(), remote.as_slice());
    }

    #[tokio::test]
    async fn test_sync_once_failure_leaves_book_untouched() {
        let mut book = QuoteBook::seeded();
        let mut engine = SyncEngine::new(FakeRemote::failing());

        let err = engine.sync_once(&mut book).await.unwrap_err();

        assert!(matches!(err, QuoteError::Status(503)));
        assert_eq!(engine.phase(), SyncPhase::Failed);
        assert_eq!(book.len(), 3);
    }

    #[tokio::test]
    async fn test_start_refuses_while_fetch_outstanding() {
        let mut book = QuoteBook::seeded();
        let mut engine = SyncEngine::new(FakeRemote::with_quotes(server_set(5)));

        assert!(engine.start());
        assert!(!engine.start());
        assert!(engine.in_flight());

        let outcome = loop {
            if let Some(result) = engine.poll(&mut book).await {
                break result.unwrap();
            }
            tokio::task::yield_now().await;
        };

        assert!(outcome.replaced);
        assert_eq!(book.len(), 5);
        assert_eq!(engine.phase(), SyncPhase::Idle);

        // The cycle is over; a new one may begin.
        assert!(engine.start());
    }

    #[tokio::test]
    async fn test_poll_without_fetch_is_none() {
        let mut book = QuoteBook::new();
        let mut engine = SyncEngine::new(FakeRemote::with_quotes(Vec::new()));

        assert_eq!(engine.poll(&mut book).await.map(|_| ()), None);
    }

    #[tokio::test]
    async fn test_post_echoes_record() {
        let engine = SyncEngine::new(FakeRemote::with_quotes(Vec::new()));
        let quote = Quote::new("Carpe diem", "Motivation");

        let echoed = engine.post(quote.clone()).await.unwrap().unwrap();

        assert_eq!(echoed, quote);
    }
}
