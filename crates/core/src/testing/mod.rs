//! Testing utilities and fake collaborators.
//!
//! This module provides in-process stand-ins for the two external
//! resources the core talks to, so the whole session can be exercised
//! without a network or a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookshelf_core::testing::{fixtures, MemoryStorage, MockCatalogSource};
//!
//! let source = MockCatalogSource::with_books(fixtures::numbered_books(13));
//! let storage = MemoryStorage::new();
//!
//! // Make the next fetch fail
//! source.set_next_error(FetchError::Network("offline".into())).await;
//!
//! // Make durable writes fail
//! storage.set_fail_writes(true);
//! ```

mod memory_storage;
mod mock_catalog_source;

pub use memory_storage::MemoryStorage;
pub use mock_catalog_source::MockCatalogSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::book::Book;

    /// Create a book with reasonable defaults for the remaining fields.
    pub fn book(id: &str, title: &str, authors: &[&str]) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            published_year: 2000,
            cover_image: format!("https://covers.example.com/{}.jpg", id),
            description: format!("About {}.", title),
        }
    }

    /// `count` books with ids `book-1..=book-count`, titles "Book N" and
    /// authors "Author N".
    pub fn numbered_books(count: usize) -> Vec<Book> {
        (1..=count)
            .map(|i| {
                let mut b = book(
                    &format!("book-{}", i),
                    &format!("Book {}", i),
                    &[&format!("Author {}", i)],
                );
                b.published_year = 1900 + i as i32;
                b
            })
            .collect()
    }
}
