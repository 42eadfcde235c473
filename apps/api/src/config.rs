//! API server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;

use orderdesk_pay::ProviderConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file path
    pub database_path: String,

    /// Externally reachable base URL, used for provider redirect URLs
    pub public_base_url: String,

    /// Default page size for order listings
    pub order_list_limit: u32,

    /// Payment provider credentials and endpoint
    pub provider: ProviderConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: lookup("HTTP_PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "./orderdesk.db".to_string()),

            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8000".to_string())
                .trim_end_matches('/')
                .to_string(),

            order_list_limit: lookup("ORDER_LIST_LIMIT")
                .unwrap_or_else(|| "50".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ORDER_LIST_LIMIT".to_string()))?,

            provider: ProviderConfig::from_lookup(&lookup)?,
        };

        if !config.public_base_url.starts_with("http://")
            && !config.public_base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue("PUBLIC_BASE_URL".to_string()));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Provider(#[from] orderdesk_pay::ConfigError),
}
