//! Single-flight cache around the remote catalog.
//!
//! The cache owns the only copy of the current [`CatalogSnapshot`]. Readers
//! get an `Arc` to it, so replacing the snapshot never exposes a partially
//! built catalog: a reader holds either the old one or the new one.
//!
//! At most one fetch is outstanding at a time. The fetch runs on its own
//! Tokio task, so it finishes and publishes its result even when every caller
//! stopped waiting. Callers that arrive while a fetch is running await the
//! same shared future instead of starting another request. Every fetch
//! carries a generation number; a response is applied only if its generation
//! is still current, so anything that completes after
//! [`CatalogFetchCache::cancel`] is discarded.

mod state;

pub use state::FetchState;

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::book::{Book, CatalogSnapshot};
use crate::catalog_source::{CatalogSource, FetchError};
use crate::metrics;

type LoadResult = Result<Arc<CatalogSnapshot>, FetchError>;
type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

struct InFlight {
    generation: u64,
    future: SharedLoad,
    abort: AbortHandle,
    /// State to restore if this load is cancelled.
    previous: FetchState,
}

struct Inner {
    state: FetchState,
    snapshot: Option<Arc<CatalogSnapshot>>,
    generation: u64,
    in_flight: Option<InFlight>,
}

struct CacheCore {
    source: Arc<dyn CatalogSource>,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<FetchState>,
}

impl CacheCore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a finished fetch if it is still the current one.
    fn complete(
        &self,
        generation: u64,
        result: Result<Vec<Book>, FetchError>,
        elapsed: Duration,
    ) -> LoadResult {
        let mut inner = self.lock();

        let current = inner
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation);
        if !current {
            debug!(generation, "Discarding catalog response from abandoned load");
            metrics::CATALOG_FETCHES
                .with_label_values(&[FetchError::Cancelled.kind()])
                .inc();
            return Err(FetchError::Cancelled);
        }
        inner.in_flight = None;

        metrics::CATALOG_FETCH_DURATION
            .with_label_values(&[])
            .observe(elapsed.as_secs_f64());

        match result {
            Ok(books) => {
                let snapshot = Arc::new(CatalogSnapshot::new(books));
                inner.snapshot = Some(Arc::clone(&snapshot));
                inner.state = FetchState::Ready(Arc::clone(&snapshot));
                self.state_tx.send_replace(inner.state.clone());

                metrics::CATALOG_FETCHES.with_label_values(&["success"]).inc();
                metrics::CATALOG_BOOKS.set(snapshot.len() as i64);
                info!(
                    books = snapshot.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Catalog loaded"
                );
                Ok(snapshot)
            }
            Err(e) => {
                inner.snapshot = None;
                inner.state = FetchState::Failed(e.clone());
                self.state_tx.send_replace(inner.state.clone());

                metrics::CATALOG_FETCHES.with_label_values(&[e.kind()]).inc();
                metrics::CATALOG_BOOKS.set(0);
                warn!(kind = e.kind(), "Catalog load failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Cloneable handle to the catalog cache.
///
/// Clones share the same snapshot, state and in-flight fetch.
#[derive(Clone)]
pub struct CatalogFetchCache {
    core: Arc<CacheCore>,
}

impl CatalogFetchCache {
    /// Create an idle cache over `source`. Nothing is fetched until `load()`.
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        let (state_tx, _) = watch::channel(FetchState::Idle);
        Self {
            core: Arc::new(CacheCore {
                source,
                inner: Mutex::new(Inner {
                    state: FetchState::Idle,
                    snapshot: None,
                    generation: 0,
                    in_flight: None,
                }),
                state_tx,
            }),
        }
    }

    /// Ensure the catalog is loaded.
    ///
    /// Returns the current snapshot without a request when the cache is
    /// already `Ready`, joins the outstanding fetch when `Loading`, and starts
    /// a fetch from `Idle` or `Failed`.
    ///
    /// Must be called from within a Tokio runtime. Dropping the returned
    /// future stops waiting but does not stop the fetch.
    pub async fn load(&self) -> LoadResult {
        let future = {
            let mut inner = self.core.lock();
            if let FetchState::Ready(snapshot) = &inner.state {
                return Ok(Arc::clone(snapshot));
            }
            self.start_or_join(&mut inner)
        };
        future.await
    }

    /// Fetch again even if a snapshot is already available.
    ///
    /// Readers keep seeing the previous snapshot until the new one lands.
    /// Joins the outstanding fetch if one is running.
    pub async fn reload(&self) -> LoadResult {
        let future = {
            let mut inner = self.core.lock();
            self.start_or_join(&mut inner)
        };
        future.await
    }

    fn start_or_join(&self, inner: &mut Inner) -> SharedLoad {
        if let Some(in_flight) = &inner.in_flight {
            debug!(
                generation = in_flight.generation,
                "Joining in-flight catalog load"
            );
            return in_flight.future.clone();
        }

        inner.generation += 1;
        let generation = inner.generation;

        let source = Arc::clone(&self.core.source);
        let core: Weak<CacheCore> = Arc::downgrade(&self.core);
        let fetch = async move {
            let started = Instant::now();
            let result = AssertUnwindSafe(source.fetch_all())
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(FetchError::Network("catalog source panicked".into())));
            match core.upgrade() {
                Some(core) => core.complete(generation, result, started.elapsed()),
                None => Err(FetchError::Cancelled),
            }
        };

        let task = tokio::spawn(fetch);
        let abort = task.abort_handle();
        let future = task
            .map(|joined| joined.unwrap_or(Err(FetchError::Cancelled)))
            .boxed()
            .shared();

        let previous = std::mem::replace(&mut inner.state, FetchState::Loading);
        inner.in_flight = Some(InFlight {
            generation,
            future: future.clone(),
            abort,
            previous,
        });
        self.core.state_tx.send_replace(FetchState::Loading);

        debug!(
            generation,
            source = self.core.source.name(),
            "Starting catalog load"
        );
        future
    }

    /// Abandon the in-flight load, if any.
    ///
    /// Waiting callers resolve to [`FetchError::Cancelled`], the state goes
    /// back to what it was before the load started, and a response that
    /// still arrives is dropped. Does nothing when no load is running.
    pub fn cancel(&self) {
        let mut inner = self.core.lock();
        if let Some(in_flight) = inner.in_flight.take() {
            in_flight.abort.abort();
            inner.generation += 1;
            inner.state = in_flight.previous;
            self.core.state_tx.send_replace(inner.state.clone());
            info!(generation = in_flight.generation, "Catalog load cancelled");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FetchState {
        self.core.lock().state.clone()
    }

    /// The snapshot readers should use, or `None` when the catalog is
    /// unavailable. Stays on the previous snapshot while a reload runs.
    pub fn snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        self.core.lock().snapshot.clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.core.state_tx.subscribe()
    }
}

impl std::fmt::Debug for CatalogFetchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogFetchCache")
            .field("source", &self.core.source.name())
            .field("state", &self.state().name())
            .finish()
    }
}
