//! HTTP catalog client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{decode_catalog, CatalogSource, FetchError};
use crate::book::Book;
use crate::config::CatalogConfig;

/// Fetches the catalog with a single GET against the configured URL.
pub struct HttpCatalogSource {
    client: Client,
    url: String,
    /// Credential-free form of `url` for logs.
    host: String,
}

impl HttpCatalogSource {
    /// Create a new client from catalog configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            host: config.host().unwrap_or_default(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_all(&self) -> Result<Vec<Book>, FetchError> {
        debug!(host = %self.host, "Fetching catalog");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(host = %self.host, "Catalog source returned {}", status);
            return Err(FetchError::Server {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| {
                FetchError::Network(format!(
                    "Failed to read response body: {}",
                    e.without_url()
                ))
            })?;

        decode_catalog(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
