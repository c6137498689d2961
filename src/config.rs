//! Configuration management for Tempo Tarifs
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files. Every field has a default so a partial file
//! (or none at all) yields a usable configuration.

use crate::error::{Result, TempoError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod defaults;

/// Display name used when none is configured
pub const DEFAULT_NAME: &str = "EDF Tempo Tarifs";

/// Base URL of the public Tempo colour API
pub const API_BASE_URL: &str = "https://www.api-couleur-tempo.fr/api";

/// Poll period used when none is configured
pub const DEFAULT_UPDATE_INTERVAL_MINUTES: u64 = 30;

/// Lowest poll period accepted at configuration time
pub const MIN_UPDATE_INTERVAL_MINUTES: u64 = 5;

/// Highest poll period accepted at configuration time (one week)
pub const MAX_UPDATE_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Per-request time budget (not configurable)
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Display name of this instance
    pub name: String,

    /// Poll period in minutes (minimum 5)
    pub update_interval_minutes: u64,

    /// Delay before retrying set-up when the API is unreachable at startup
    pub startup_retry_seconds: u64,

    /// Tempo API endpoint configuration
    pub api: ApiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Web server binding configuration
    pub web: WebConfig,
}

/// Tempo API location
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console level override
    pub console_level: Option<String>,

    /// Optional file level override
    pub file_level: Option<String>,

    /// Path to log file (its directory receives the rolling files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Default search locations, in priority order
    pub fn default_paths() -> [&'static str; 3] {
        [
            "tempo_config.yaml",
            "/data/tempo_config.yaml",
            "/etc/tempo/config.yaml",
        ]
    }

    /// First existing file among the default locations
    pub fn locate() -> Option<&'static str> {
        Self::default_paths()
            .into_iter()
            .find(|path| Path::new(path).exists())
    }

    /// Load configuration from the default locations, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::locate() {
            Some(path) => Self::from_file(path),
            None => Ok(Config::default()),
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validated poll period
    pub fn update_interval(&self) -> Result<Duration> {
        update_interval_from_minutes(self.update_interval_minutes)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TempoError::validation("name", "Name cannot be empty"));
        }

        self.update_interval()?;

        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(TempoError::validation(
                "api.base_url",
                "Must be an http:// or https:// URL",
            ));
        }

        if self.web.port == 0 {
            return Err(TempoError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Convert a configured interval in minutes into a poll period.
///
/// Values outside [`MIN_UPDATE_INTERVAL_MINUTES`]..=[`MAX_UPDATE_INTERVAL_MINUTES`]
/// are rejected so an invalid period never reaches the scheduler.
pub fn update_interval_from_minutes(minutes: u64) -> Result<Duration> {
    if minutes < MIN_UPDATE_INTERVAL_MINUTES {
        return Err(TempoError::Validation {
            field: "update_interval_minutes".to_string(),
            message: format!(
                "Must be at least {} minutes (got {})",
                MIN_UPDATE_INTERVAL_MINUTES, minutes
            ),
        });
    }
    if minutes > MAX_UPDATE_INTERVAL_MINUTES {
        return Err(TempoError::Validation {
            field: "update_interval_minutes".to_string(),
            message: format!(
                "Must be at most {} minutes (got {})",
                MAX_UPDATE_INTERVAL_MINUTES, minutes
            ),
        });
    }
    Ok(Duration::from_secs(minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.name, "EDF Tempo Tarifs");
        assert_eq!(config.update_interval_minutes, 30);
        assert_eq!(config.api.base_url, API_BASE_URL);
        assert_eq!(config.web.port, 8089);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.update_interval_minutes = 4;
        assert!(config.validate().is_err());

        config = Config::default();
        config.update_interval_minutes = 5;
        assert!(config.validate().is_ok());

        config = Config::default();
        config.api.base_url = "ftp://example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_update_interval_conversion() {
        assert_eq!(
            update_interval_from_minutes(30).unwrap(),
            Duration::from_secs(1800)
        );
        let err = update_interval_from_minutes(4).unwrap_err();
        assert!(matches!(err, TempoError::Validation { .. }));
        assert_eq!(
            update_interval_from_minutes(MAX_UPDATE_INTERVAL_MINUTES).unwrap(),
            Duration::from_secs(7 * 24 * 3600)
        );
        assert!(update_interval_from_minutes(MAX_UPDATE_INTERVAL_MINUTES + 1).is_err());
        assert!(update_interval_from_minutes(u64::MAX / 60).is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("update_interval_minutes: 15\n").unwrap();
        assert_eq!(config.update_interval_minutes, 15);
        assert_eq!(config.name, DEFAULT_NAME);
        assert_eq!(config.logging.level, "INFO");
    }
}
