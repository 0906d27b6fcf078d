/// Search term and page requested by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// Raw search term; matching ignores case.
    pub search_term: String,
    /// 1-based page number.
    pub page: usize,
}

impl QueryState {
    pub fn new(search_term: impl Into<String>, page: usize) -> Self {
        Self {
            search_term: search_term.into(),
            page: page.max(1),
        }
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            page: 1,
        }
    }
}
