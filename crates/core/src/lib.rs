pub mod book;
pub mod catalog_source;
pub mod config;
pub mod detail;
pub mod favorites;
pub mod fetch_cache;
pub mod metrics;
pub mod session;
pub mod testing;
pub mod view;

pub use book::{Book, CatalogSnapshot};
pub use catalog_source::{decode_catalog, CatalogSource, FetchError, HttpCatalogSource};
pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, CatalogConfig,
    Config, ConfigError, SanitizedConfig, StorageConfig,
};
pub use detail::{BookDetail, DetailError, DetailResolver};
pub use favorites::{
    FavoriteSet, FavoritesError, FavoritesStartup, FavoritesStorage, FavoritesStore,
    SqliteStorage, StorageError, UnavailableStorage, DEFAULT_FAVORITES_KEY,
};
pub use fetch_cache::{CatalogFetchCache, FetchState};
pub use session::{CatalogSession, SessionError};
pub use view::{
    render_page, total_pages, CatalogPage, CatalogView, PageView, QueryState, PAGE_SIZE,
};
