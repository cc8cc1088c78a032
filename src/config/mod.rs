//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::gateway::{GatewayConfig, DEFAULT_BASE_URL};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the statistics API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Minimum spacing between requests, in milliseconds
    #[serde(default = "default_min_request_interval")]
    pub min_request_interval_ms: u64,

    /// Wait before retrying a throttled request, in milliseconds
    #[serde(default = "default_throttle_penalty")]
    pub throttle_penalty_ms: u64,

    /// Stop retrying throttled requests after this many attempts (unset = never)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_throttle_retries: Option<u32>,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// How many recent matches to analyze
    #[serde(default = "default_recent_match_limit")]
    pub recent_match_limit: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_min_request_interval() -> u64 {
    250
}

fn default_throttle_penalty() -> u64 {
    5000
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("party-tracker/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_recent_match_limit() -> u32 {
    50
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            min_request_interval_ms: default_min_request_interval(),
            throttle_penalty_ms: default_throttle_penalty(),
            max_throttle_retries: None,
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            recent_match_limit: default_recent_match_limit(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = Url::parse(&self.api.base_url) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid API base URL {}: {}",
                self.api.base_url, e
            )));
        }

        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if self.api.throttle_penalty_ms <= self.api.min_request_interval_ms {
            return Err(ConfigError::ValidationError(
                "Throttle penalty must be longer than the request interval".to_string(),
            ));
        }

        if self.api.recent_match_limit == 0 {
            return Err(ConfigError::ValidationError(
                "Recent match limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Gateway settings derived from this configuration.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.api.base_url.clone(),
            min_request_interval: Duration::from_millis(self.api.min_request_interval_ms),
            throttle_penalty: Duration::from_millis(self.api.throttle_penalty_ms),
            max_throttle_retries: self.api.max_throttle_retries,
            timeout: Duration::from_secs(self.api.timeout_seconds),
            user_agent: self.api.user_agent.clone(),
            recent_match_limit: self.api.recent_match_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.api.base_url, "https://api.opendota.com/api/");
        assert_eq!(config.api.min_request_interval_ms, 250);
        assert_eq!(config.api.throttle_penalty_ms, 5000);
        assert_eq!(config.api.recent_match_limit, 50);
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = AppConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_penalty_not_longer_than_interval() {
        let mut config = AppConfig::default();
        config.api.throttle_penalty_ms = 250;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_match_limit() {
        let mut config = AppConfig::default();
        config.api.recent_match_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.api.base_url, parsed.api.base_url);
        assert_eq!(parsed.api.max_throttle_retries, None);
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "log_level = \"debug\"\n\n[api]\nmin_request_interval_ms = 1000\nmax_throttle_retries = 3"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.api.min_request_interval_ms, 1000);
        assert_eq!(config.api.max_throttle_retries, Some(3));
        assert_eq!(config.api.throttle_penalty_ms, 5000);
    }

    #[test]
    fn test_from_file_invalid_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\ntimeout_seconds = 0").unwrap();

        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_gateway_config_conversion() {
        let mut config = AppConfig::default();
        config.api.max_throttle_retries = Some(4);
        let gateway = config.gateway_config();

        assert_eq!(gateway.min_request_interval, Duration::from_millis(250));
        assert_eq!(gateway.throttle_penalty, Duration::from_secs(5));
        assert_eq!(gateway.max_throttle_retries, Some(4));
        assert_eq!(gateway.timeout, Duration::from_secs(30));
    }
}
