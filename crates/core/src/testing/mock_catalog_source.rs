//! Mock catalog source for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::book::Book;
use crate::catalog_source::{CatalogSource, FetchError};

/// Mock implementation of the CatalogSource trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable catalog
/// - Count fetches for single-flight assertions
/// - Delay responses to keep a fetch in flight
/// - Simulate failures
#[derive(Debug, Clone)]
pub struct MockCatalogSource {
    /// Books returned by the next successful fetch.
    books: Arc<RwLock<Vec<Book>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FetchError>>>,
    /// Artificial latency per fetch.
    delay: Arc<RwLock<Duration>>,
    /// Number of fetches started.
    fetches: Arc<AtomicUsize>,
}

impl Default for MockCatalogSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogSource {
    /// Create a mock serving an empty catalog.
    pub fn new() -> Self {
        Self::with_books(Vec::new())
    }

    /// Create a mock serving `books`.
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Arc::new(RwLock::new(books)),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the catalog served by later fetches.
    pub async fn set_books(&self, books: Vec<Book>) {
        *self.books.write().await = books;
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Delay every fetch by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn fetch_all(&self) -> Result<Vec<Book>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(self.books.read().await.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
