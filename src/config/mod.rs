//! Configuration module for the Souk credits client
//!
//! Provides layered configuration loading from files, environment variables,
//! and defaults.
//!
//! # Configuration Precedence
//!
//! 1. Environment variables (`SOUK_*`)
//! 2. Configuration file (TOML)
//! 3. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use souk::config::SoukConfig;
//!
//! // Load defaults
//! let config = SoukConfig::default();
//! assert_eq!(config.poller.interval_seconds, 30);
//!
//! // Parse from TOML
//! let toml = r#"
//! [api]
//! locale = "ar"
//! "#;
//! let config: SoukConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.api.locale.as_str(), "ar");
//! ```

pub mod api;
pub mod error;
pub mod logging;
pub mod poller;

pub use api::{ApiConfig, Locale};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use poller::PollerConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Unified configuration for the credits client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SoukConfig {
    /// Backend API location
    pub api: ApiConfig,
    /// Credit event polling configuration
    pub poller: PollerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl SoukConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports SOUK_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        // Deployment profile first, so specific overrides below still win
        if let Ok(env) = std::env::var("SOUK_ENV") {
            if env.eq_ignore_ascii_case("production") {
                self.poller.apply_production_profile();
            }
        }

        // API settings
        if let Ok(base_url) = std::env::var("SOUK_API_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Ok(locale) = std::env::var("SOUK_LOCALE") {
            if let Ok(l) = locale.parse() {
                self.api.locale = l;
            }
        }

        // Poller settings
        if let Ok(interval) = std::env::var("SOUK_POLL_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.poller.interval_seconds = i;
            }
        }

        // Logging settings
        if let Ok(level) = std::env::var("SOUK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SOUK_LOG_FORMAT") {
            if let Ok(f) = LogFormat::from_str(&format) {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.is_empty() {
            return Err(ConfigError::Validation {
                field: "api.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation {
                field: "api.base_url".to_string(),
                message: "must start with http:// or https://".to_string(),
            });
        }
        if self.poller.interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "poller.interval_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.poller.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "poller.timeout_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
