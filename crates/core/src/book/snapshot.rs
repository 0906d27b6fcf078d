use chrono::{DateTime, Utc};

use super::Book;

/// An immutable catalog captured by one successful fetch.
///
/// Snapshots are shared behind `Arc` and replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    books: Vec<Book>,
    fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Capture a snapshot stamped with the current time.
    pub fn new(books: Vec<Book>) -> Self {
        Self::with_timestamp(books, Utc::now())
    }

    pub fn with_timestamp(books: Vec<Book>, fetched_at: DateTime<Utc>) -> Self {
        Self { books, fetched_at }
    }

    /// Books in remote order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Look a book up by id. The first entry wins if the remote repeats an id.
    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_get_by_id() {
        let snapshot = CatalogSnapshot::new(fixtures::numbered_books(3));
        assert_eq!(snapshot.get("book-2").unwrap().title, "Book 2");
        assert!(snapshot.get("book-9").is_none());
    }

    #[test]
    fn test_get_first_duplicate_wins() {
        let mut books = fixtures::numbered_books(1);
        let mut dup = books[0].clone();
        dup.title = "Second copy".to_string();
        books.push(dup);

        let snapshot = CatalogSnapshot::new(books);
        assert_eq!(snapshot.get("book-1").unwrap().title, "Book 1");
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CatalogSnapshot::new(vec![]);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
    }
}
