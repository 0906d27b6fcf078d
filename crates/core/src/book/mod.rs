//! Book records and the catalog snapshot they are delivered in.

mod snapshot;

pub use snapshot::CatalogSnapshot;

use serde::{Deserialize, Serialize};

/// A single catalog entry.
///
/// `id` is the only identity key. Lookups and favorite membership always go
/// through it; two books with identical titles and years are still different
/// books if their ids differ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Identifier, unique within a snapshot.
    pub id: String,
    /// Title as published.
    pub title: String,
    /// Authors in credit order.
    pub authors: Vec<String>,
    /// Year of first publication.
    #[serde(default)]
    pub published_year: i32,
    /// Cover image URI.
    #[serde(default)]
    pub cover_image: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

impl Book {
    /// Authors joined for display ("A, B").
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Whether this book matches an already case-folded search term.
    ///
    /// An empty term matches every book.
    pub fn matches_folded(&self, folded_term: &str) -> bool {
        if folded_term.is_empty() {
            return true;
        }

        self.title.to_lowercase().contains(folded_term)
            || self
                .authors
                .iter()
                .any(|author| author.to_lowercase().contains(folded_term))
    }

    /// Whether this book matches a raw search term, ignoring case.
    pub fn matches(&self, term: &str) -> bool {
        self.matches_folded(&term.to_lowercase())
    }
}
