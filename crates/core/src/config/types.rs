use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// URL returning the full catalog as a JSON array
    #[serde(default = "default_catalog_url")]
    pub url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User-Agent override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl CatalogConfig {
    /// The User-Agent to send, falling back to "Bookshelf/<version>".
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("Bookshelf/{}", env!("CARGO_PKG_VERSION")))
    }

    /// The catalog URL, if it parses as an http(s) URL with a host.
    pub fn parsed_url(&self) -> Option<Url> {
        let url = Url::parse(&self.url).ok()?;
        let web = matches!(url.scheme(), "http" | "https") && url.host_str().is_some();
        web.then_some(url)
    }

    /// Host of the catalog URL with its explicit port, if any.
    ///
    /// Never includes credentials, path or query, so it is safe to log.
    pub fn host(&self) -> Option<String> {
        let url = self.parsed_url()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

fn default_catalog_url() -> String {
    "https://my-json-server.typicode.com/pranayBaynineventures/assignment-get_all_books/books"
        .to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Durable storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// SQLite database file holding the favorites slot
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Slot key the favorites are stored under
    #[serde(default = "default_favorites_key")]
    pub favorites_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            favorites_key: default_favorites_key(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("bookshelf.db")
}

fn default_favorites_key() -> String {
    "favoriteBooks".to_string()
}

/// Config summary for display
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub catalog: SanitizedCatalogConfig,
    pub storage: StorageConfig,
}

/// Catalog config reduced to what is safe to print (no query strings)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub host: Option<String>,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            catalog: SanitizedCatalogConfig {
                host: config.catalog.host(),
                timeout_secs: config.catalog.timeout_secs,
            },
            storage: config.storage.clone(),
        }
    }
}
