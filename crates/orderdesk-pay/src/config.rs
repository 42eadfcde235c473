//! Payment provider configuration.
//!
//! Loaded from environment variables with fallback to defaults. Credentials
//! live here and are handed to the adapter at construction; nothing on the
//! pricing path ever sees them.

use std::env;
use std::fmt;
use std::time::Duration;

/// Default Stripe REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com/v1";

/// Provider configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Secret API key (server side only)
    pub secret_key: String,

    /// Publishable key, handed to browser clients
    pub public_key: String,

    /// REST base URL, overridable for tests
    pub api_base: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Country attached to created tax rates
    pub tax_country: String,
}

impl ProviderConfig {
    /// Creates a configuration with default endpoint, timeout and country.
    pub fn new(secret_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        ProviderConfig {
            secret_key: secret_key.into(),
            public_key: public_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            tax_country: "RU".to_string(),
        }
    }

    /// Sets the REST base URL.
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// `STRIPE_SECRET_KEY` and `STRIPE_PUBLIC_KEY` are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
        };

        let mut config = ProviderConfig::new(
            required("STRIPE_SECRET_KEY")?,
            required("STRIPE_PUBLIC_KEY")?,
        );

        if let Some(base) = lookup("STRIPE_API_BASE") {
            config = config.api_base(base);
        }

        if let Some(secs) = lookup("STRIPE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STRIPE_TIMEOUT_SECS".to_string()))?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(country) = lookup("STRIPE_TAX_COUNTRY") {
            config.tax_country = country.trim().to_uppercase();
        }

        Ok(config)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("secret_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("tax_country", &self.tax_country)
            .finish()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
