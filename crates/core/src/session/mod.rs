//! One browsing session: the fetch cache, the list view, the detail
//! resolver and the favorites store, wired over the same snapshot.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::book::Book;
use crate::catalog_source::{CatalogSource, FetchError, HttpCatalogSource};
use crate::config::Config;
use crate::detail::{BookDetail, DetailError, DetailResolver};
use crate::favorites::{
    FavoritesError, FavoritesStorage, FavoritesStore, SqliteStorage, UnavailableStorage,
};
use crate::fetch_cache::CatalogFetchCache;
use crate::view::{CatalogPage, CatalogView};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to create catalog source: {0}")]
    Source(#[source] FetchError),

    #[error(transparent)]
    Detail(#[from] DetailError),

    #[error(transparent)]
    Favorites(#[from] FavoritesError),
}

/// Everything a front end needs to browse the catalog.
///
/// The components are also reachable on their own; the convenience methods
/// here only chain them (load the catalog, then read it).
pub struct CatalogSession {
    cache: CatalogFetchCache,
    view: CatalogView,
    detail: DetailResolver,
    favorites: Arc<FavoritesStore>,
}

impl CatalogSession {
    /// Wire a session over injected collaborators.
    pub fn new(
        source: Arc<dyn CatalogSource>,
        storage: Arc<dyn FavoritesStorage>,
        favorites_key: impl Into<String>,
    ) -> Self {
        let cache = CatalogFetchCache::new(source);
        let favorites = Arc::new(FavoritesStore::open_with_key(storage, favorites_key));

        Self {
            view: CatalogView::new(cache.clone()),
            detail: DetailResolver::new(cache.clone()),
            cache,
            favorites,
        }
    }

    /// Build the HTTP source and the SQLite store described by `config`.
    ///
    /// A favorites database that cannot be opened does not fail the session:
    /// favorites start empty and every mutation reports a persistence error.
    pub fn from_config(config: &Config) -> Result<Self, SessionError> {
        let source = HttpCatalogSource::new(&config.catalog).map_err(SessionError::Source)?;
        let storage: Arc<dyn FavoritesStorage> = match SqliteStorage::new(&config.storage.path) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                warn!(
                    db = ?config.storage.path,
                    "Favorites storage unavailable, continuing without it: {}", e
                );
                Arc::new(UnavailableStorage::new(e.to_string()))
            }
        };

        info!(
            host = %source.host(),
            db = ?config.storage.path,
            "Catalog session configured"
        );

        Ok(Self::new(
            Arc::new(source),
            storage,
            config.storage.favorites_key.clone(),
        ))
    }

    pub fn cache(&self) -> &CatalogFetchCache {
        &self.cache
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    pub fn detail(&self) -> &DetailResolver {
        &self.detail
    }

    pub fn favorites(&self) -> &Arc<FavoritesStore> {
        &self.favorites
    }

    /// Make sure a load was attempted, logging a failure instead of
    /// returning it; the cache state carries the error.
    async fn ensure_loaded(&self) {
        if let Err(e) = self.cache.load().await {
            warn!(kind = e.kind(), "Catalog unavailable: {}", e);
        }
    }

    /// Load the catalog if needed and render the current page.
    pub async fn browse(&self) -> CatalogPage {
        self.ensure_loaded().await;
        self.view.render()
    }

    /// Load the catalog if needed and resolve `id` with its favorite flag.
    pub async fn book_detail(&self, id: &str) -> Result<BookDetail, DetailError> {
        self.ensure_loaded().await;
        self.detail.resolve_detail(id, &self.favorites)
    }

    /// Favorite the catalog book `id`.
    pub async fn add_favorite(&self, id: &str) -> Result<Book, SessionError> {
        let book = self.book_detail(id).await?.book;
        self.favorites.add(book.clone())?;
        Ok(book)
    }

    /// Flip the favorite flag of the catalog book `id`; returns the new flag.
    pub async fn toggle_favorite(&self, id: &str) -> Result<bool, SessionError> {
        let book = self.book_detail(id).await?.book;
        Ok(self.favorites.toggle(book)?)
    }

    /// Unfavorite `id`. Works without the catalog, since favorites are
    /// stored by value.
    pub fn remove_favorite(&self, id: &str) -> Result<bool, SessionError> {
        Ok(self.favorites.remove(id)?)
    }
}
