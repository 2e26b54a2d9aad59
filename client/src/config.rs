//! Configuration management for the storefront client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with STOREFRONT_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// API endpoint used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Default location of the persisted session file
pub const DEFAULT_TOKEN_PATH: &str = ".storefront/session.json";

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Storefront API configuration
    pub api: ApiConfig,

    /// Persisted session storage
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL every request path is appended to.
    /// Override with `STOREFRONT__API__BASE_URL`.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding the bearer token
    pub token_path: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOREFRONT_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", DEFAULT_API_BASE_URL)?
            .set_default("storage.token_path", DEFAULT_TOKEN_PATH)?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("STOREFRONT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration pointing at an explicit API, used by tests and embedders
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            environment: "development".to_string(),
            api: ApiConfig {
                base_url: base_url.into(),
            },
            storage: StorageConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            token_path: DEFAULT_TOKEN_PATH.to_string(),
        }
    }
}
