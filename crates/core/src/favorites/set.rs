use crate::book::Book;

/// Favorited books keyed by id, in the order they were first added.
///
/// Entries are full copies, so they stay viewable after the catalog they
/// came from is replaced or fails to reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    books: Vec<Book>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a sequence, collapsing repeated ids the same way
    /// [`FavoriteSet::insert`] would.
    pub fn from_books(books: impl IntoIterator<Item = Book>) -> Self {
        let mut set = Self::new();
        for book in books {
            set.insert(book);
        }
        set
    }

    /// Insert or overwrite the entry for `book.id`.
    ///
    /// An overwritten entry keeps its original position. Returns `true` when
    /// the id was not present before.
    pub fn insert(&mut self, book: Book) -> bool {
        match self.position(&book.id) {
            Some(pos) => {
                self.books[pos] = book;
                false
            }
            None => {
                self.books.push(book);
                true
            }
        }
    }

    /// Remove the entry for `id`, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Book> {
        self.position(id).map(|pos| self.books.remove(pos))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn as_slice(&self) -> &[Book] {
        &self.books
    }

    pub fn to_vec(&self) -> Vec<Book> {
        self.books.clone()
    }

    /// Serialize as a JSON array of books, the durable slot format.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.books)
    }

    /// Decode the durable slot format.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let books: Vec<Book> = serde_json::from_str(json)?;
        Ok(Self::from_books(books))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_insert_preserves_order() {
        let mut set = FavoriteSet::new();
        assert!(set.insert(fixtures::book("b", "Second", &["X"])));
        assert!(set.insert(fixtures::book("a", "First", &["Y"])));

        let ids: Vec<&str> = set.as_slice().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_overwrite_keeps_position_and_updates_fields() {
        let mut set = FavoriteSet::new();
        set.insert(fixtures::book("1", "Old Title", &["A"]));
        set.insert(fixtures::book("2", "Other", &["B"]));

        assert!(!set.insert(fixtures::book("1", "New Title", &["A"])));
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].title, "New Title");
    }

    #[test]
    fn test_remove() {
        let mut set = FavoriteSet::from_books(fixtures::numbered_books(3));
        let removed = set.remove("book-2").unwrap();
        assert_eq!(removed.title, "Book 2");
        assert!(!set.contains("book-2"));
        assert!(set.remove("book-2").is_none());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let set = FavoriteSet::from_books(vec![
            fixtures::book("z", "Zed", &["A"]),
            fixtures::book("a", "Aye", &["B", "C"]),
        ]);

        let json = set.to_json().unwrap();
        let decoded = FavoriteSet::from_json(&json).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn test_from_json_collapses_duplicate_ids() {
        let json = r#"[
            {"id":"1","title":"First","authors":["A"]},
            {"id":"2","title":"Second","authors":["B"]},
            {"id":"1","title":"First (edited)","authors":["A"]}
        ]"#;

        let set = FavoriteSet::from_json(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("1").unwrap().title, "First (edited)");
        assert_eq!(set.as_slice()[0].id, "1");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(FavoriteSet::from_json("not json").is_err());
        assert!(FavoriteSet::from_json(r#"{"id":"1"}"#).is_err());
    }
}
