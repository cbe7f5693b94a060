//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GREENCART_DATA_DIR` - Directory for the JSON key/value storage
//!
//! ## Optional
//! - `GREENCART_API_BASE_URL` - Remote API base URL (e.g.
//!   `http://localhost:8080/api`); when unset the store runs local-only
//! - `GREENCART_REQUEST_TIMEOUT_SECS` - Remote request timeout (default: 10)
//! - `GREENCART_PROCESSING_DELAY_MS` - Simulated order-processing delay
//!   before checkout completes (default: 2000)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROCESSING_DELAY_MS: u64 = 2000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory holding the persisted JSON records
    pub data_dir: PathBuf,
    /// Remote API base URL; `None` means local-only operation
    pub api_base_url: Option<String>,
    /// Timeout applied to every remote request
    pub request_timeout: Duration,
    /// Simulated processing delay applied by the order recorder
    pub processing_delay: Duration,
}

impl StorefrontConfig {
    /// Load configuration from the environment, reading `.env` first if
    /// present.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from already-set environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = require_env("GREENCART_DATA_DIR")?.into();
        let api_base_url = optional_env("GREENCART_API_BASE_URL");

        let request_timeout = Duration::from_secs(parse_env(
            "GREENCART_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        let processing_delay = Duration::from_millis(parse_env(
            "GREENCART_PROCESSING_DELAY_MS",
            DEFAULT_PROCESSING_DELAY_MS,
        )?);

        Ok(Self {
            data_dir,
            api_base_url,
            request_timeout,
            processing_delay,
        })
    }

    /// Local-only configuration rooted at `data_dir`, with no remote API
    /// and no processing delay. Intended for tests and embedded use.
    #[must_use]
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            api_base_url: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            processing_delay: Duration::ZERO,
        }
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar(name.to_owned(), raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_config_defaults() {
        let config = StorefrontConfig::local("/tmp/greencart");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/greencart"));
        assert!(config.api_base_url.is_none());
        assert_eq!(config.processing_delay, Duration::ZERO);
        assert_eq!(
            config.request_timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }
}
