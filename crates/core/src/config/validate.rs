use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog URL is http(s)
/// - Catalog timeout is not 0
/// - Favorites slot key is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.catalog.parsed_url().is_none() {
        return Err(ConfigError::ValidationError(
            "catalog.url must be an http(s) URL with a host".to_string(),
        ));
    }

    if config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.storage.favorites_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.favorites_key cannot be empty".to_string(),
        ));
    }

    Ok(())
}
