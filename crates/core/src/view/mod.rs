//! Search and pagination over the catalog snapshot.
//!
//! [`render_page`] is the whole derivation: a pure function of the snapshot
//! (or its absence) and the [`QueryState`]. [`CatalogView`] only stores the
//! query and reads the current snapshot from the fetch cache.

mod query;

pub use query::QueryState;

use serde::Serialize;
use tokio::sync::watch;

use crate::book::{Book, CatalogSnapshot};
use crate::fetch_cache::CatalogFetchCache;

/// Books shown per page.
pub const PAGE_SIZE: usize = 12;

/// One rendered page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    /// Books on the displayed page, in catalog order.
    pub items: Vec<Book>,
    /// Books matching the search term across all pages.
    pub match_count: usize,
    /// `ceil(match_count / PAGE_SIZE)`, 0 when nothing matches.
    pub total_pages: usize,
    /// The page actually displayed (1 when the stored page is out of range).
    pub page: usize,
}

impl PageView {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Result of rendering the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogPage {
    /// No snapshot is available (not loaded yet, loading, or failed).
    /// Distinct from a search that matched nothing.
    Unavailable,
    Results(PageView),
}

impl CatalogPage {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CatalogPage::Unavailable)
    }

    pub fn results(&self) -> Option<&PageView> {
        match self {
            CatalogPage::Results(view) => Some(view),
            CatalogPage::Unavailable => None,
        }
    }
}

/// Number of pages needed for `match_count` results.
pub fn total_pages(match_count: usize) -> usize {
    match_count.div_ceil(PAGE_SIZE)
}

/// Filter and paginate `snapshot` according to `query`.
///
/// A stored page outside `1..=total_pages` is displayed as page 1; the query
/// itself is not modified.
pub fn render_page(snapshot: Option<&CatalogSnapshot>, query: &QueryState) -> CatalogPage {
    let Some(snapshot) = snapshot else {
        return CatalogPage::Unavailable;
    };

    let folded = query.search_term.to_lowercase();
    let matches: Vec<&Book> = snapshot
        .books()
        .iter()
        .filter(|book| book.matches_folded(&folded))
        .collect();

    let match_count = matches.len();
    let total_pages = total_pages(match_count);
    let page = if (1..=total_pages).contains(&query.page) {
        query.page
    } else {
        1
    };

    let items = matches
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    CatalogPage::Results(PageView {
        items,
        match_count,
        total_pages,
        page,
    })
}

/// Query state plus a handle on the catalog it renders.
pub struct CatalogView {
    cache: CatalogFetchCache,
    query: watch::Sender<QueryState>,
}

impl CatalogView {
    pub fn new(cache: CatalogFetchCache) -> Self {
        let (query, _) = watch::channel(QueryState::default());
        Self { cache, query }
    }

    /// Set the search term. Also resets the page to 1.
    pub fn set_query(&self, term: impl Into<String>) {
        let term = term.into();
        self.query.send_if_modified(|state| {
            let changed = state.search_term != term || state.page != 1;
            state.search_term = term;
            state.page = 1;
            changed
        });
    }

    /// Clear the search term and go back to page 1.
    pub fn clear_query(&self) {
        self.set_query(String::new());
    }

    /// Set the page. Pages are 1-based; 0 is treated as 1.
    pub fn set_page(&self, page: usize) {
        let page = page.max(1);
        self.query.send_if_modified(|state| {
            let changed = state.page != page;
            state.page = page;
            changed
        });
    }

    /// Move one page forward from the displayed page, stopping at the last.
    ///
    /// Returns the stored page afterwards.
    pub fn next_page(&self) -> usize {
        match self.render() {
            CatalogPage::Results(view) => {
                let next = (view.page + 1).min(view.total_pages.max(1));
                self.set_page(next);
                next
            }
            CatalogPage::Unavailable => self.query().page,
        }
    }

    /// Move one page back from the displayed page, stopping at 1.
    ///
    /// Returns the stored page afterwards.
    pub fn previous_page(&self) -> usize {
        match self.render() {
            CatalogPage::Results(view) => {
                let previous = view.page.saturating_sub(1).max(1);
                self.set_page(previous);
                previous
            }
            CatalogPage::Unavailable => self.query().page,
        }
    }

    /// Current query state.
    pub fn query(&self) -> QueryState {
        self.query.borrow().clone()
    }

    /// Render against the cache's current snapshot. No side effects.
    pub fn render(&self) -> CatalogPage {
        let snapshot = self.cache.snapshot();
        let query = self.query.borrow();
        render_page(snapshot.as_deref(), &query)
    }

    /// Subscribe to query changes.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.query.subscribe()
    }
}
