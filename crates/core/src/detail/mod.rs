//! Single-book lookup against the current snapshot.

use serde::Serialize;
use thiserror::Error;

use crate::book::Book;
use crate::favorites::FavoritesStore;
use crate::fetch_cache::CatalogFetchCache;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetailError {
    /// The id is not in the snapshot, or no snapshot is available.
    #[error("Book not found: {0}")]
    NotFound(String),
}

/// A resolved book together with its favorite status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetail {
    pub book: Book,
    pub is_favorite: bool,
}

/// Read-only projection of the snapshot by id.
///
/// Never triggers a fetch; loading is up to the caller so several resolvers
/// can share one cached catalog.
#[derive(Debug, Clone)]
pub struct DetailResolver {
    cache: CatalogFetchCache,
}

impl DetailResolver {
    pub fn new(cache: CatalogFetchCache) -> Self {
        Self { cache }
    }

    pub fn resolve(&self, id: &str) -> Result<Book, DetailError> {
        self.cache
            .snapshot()
            .and_then(|snapshot| snapshot.get(id).cloned())
            .ok_or_else(|| DetailError::NotFound(id.to_string()))
    }

    /// Resolve `id` and report whether it is currently a favorite.
    pub fn resolve_detail(
        &self,
        id: &str,
        favorites: &FavoritesStore,
    ) -> Result<BookDetail, DetailError> {
        let book = self.resolve(id)?;
        let is_favorite = favorites.contains(&book.id);
        Ok(BookDetail { book, is_favorite })
    }
}
