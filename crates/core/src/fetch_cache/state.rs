use std::sync::Arc;

use crate::book::CatalogSnapshot;
use crate::catalog_source::FetchError;

/// Lifecycle of the catalog fetch.
///
/// `Idle -> Loading -> {Ready, Failed}`. A failed fetch stays failed until
/// someone calls `load()` again.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is outstanding.
    Loading,
    /// The last fetch succeeded.
    Ready(Arc<CatalogSnapshot>),
    /// The last fetch failed.
    Failed(FetchError),
}

impl FetchState {
    /// State name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Ready(_) => "ready",
            FetchState::Failed(_) => "failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, FetchState::Ready(_))
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failed(e) => Some(e),
            _ => None,
        }
    }
}
