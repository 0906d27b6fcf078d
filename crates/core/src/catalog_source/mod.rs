//! Remote catalog retrieval.
//!
//! The remote source hands back the whole catalog in one response. There is
//! no server-side paging or filtering; everything downstream works on the
//! decoded list.

mod http;

pub use http::HttpCatalogSource;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::book::Book;

/// Errors that can occur while retrieving the catalog.
///
/// Cloneable because one in-flight fetch is shared by every caller waiting
/// on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request could not complete (connection, DNS, timeout, body read).
    #[error("Network error: {0}")]
    Network(String),

    /// A response arrived but reported failure.
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// The body is not a valid catalog payload.
    #[error("Failed to decode catalog: {0}")]
    Decode(String),

    /// The load was abandoned before its response was applied.
    #[error("Catalog load cancelled")]
    Cancelled,
}

impl FetchError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Server { .. } => "server",
            FetchError::Decode(_) => "decode",
            FetchError::Cancelled => "cancelled",
        }
    }
}

/// A source the full catalog can be fetched from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every book the source knows about, in source order.
    async fn fetch_all(&self) -> Result<Vec<Book>, FetchError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Decode a catalog response body.
///
/// The whole payload is rejected if any record is missing `id`, `title` or
/// `authors`, or credits nobody. Partial catalogs are never returned.
pub fn decode_catalog(body: &str) -> Result<Vec<Book>, FetchError> {
    let books: Vec<Book> =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if let Some(pos) = books.iter().position(|b| b.authors.is_empty()) {
        return Err(FetchError::Decode(format!(
            "record {} (id '{}') has no authors",
            pos, books[pos].id
        )));
    }

    debug!("Decoded catalog with {} books", books.len());
    Ok(books)
}
