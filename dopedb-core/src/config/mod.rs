//! Configuration management for dopedb
//!
//! This module provides file and environment based configuration with
//! support for defaults and validation.

use crate::store::StoreLimits;
use humantime_serde::re::humantime;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Store limits
    #[serde(default)]
    pub store: StoreLimits,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    /// Graceful shutdown timeout
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus exporter
    pub enabled: bool,

    /// Metrics bind address
    pub bind_address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_body_bytes: 2 * 1024 * 1024, // 2 MiB
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: SocketAddr::from(([127, 0, 0, 1], 9090)),
        }
    }
}

fn parse_var<T>(name: &str, what: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(format!("Invalid {}: {}", what, e))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: DOPEDB_<SECTION>_<KEY>
    /// Example: DOPEDB_SERVER_BIND_ADDRESS=0.0.0.0:8080
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables onto an existing configuration
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Server config
        if let Some(addr) = parse_var("DOPEDB_SERVER_BIND_ADDRESS", "bind address")? {
            self.server.bind_address = addr;
        }
        if let Some(bytes) = parse_var("DOPEDB_SERVER_MAX_BODY_BYTES", "max body bytes")? {
            self.server.max_body_bytes = bytes;
        }
        if let Some(timeout) =
            parse_var::<humantime::Duration>("DOPEDB_SERVER_SHUTDOWN_TIMEOUT", "shutdown timeout")?
        {
            self.server.shutdown_timeout = timeout.into();
        }

        // Store config
        if let Some(len) = parse_var("DOPEDB_STORE_MAX_KEY_LEN", "max key length")? {
            self.store.max_key_len = len;
        }
        if let Some(len) = parse_var("DOPEDB_STORE_MAX_VALUE_LEN", "max value length")? {
            self.store.max_value_len = len;
        }
        if let Some(depth) = parse_var("DOPEDB_STORE_MAX_NAMESPACE_DEPTH", "max namespace depth")? {
            self.store.max_namespace_depth = depth;
        }
        if let Some(len) = parse_var("DOPEDB_STORE_MAX_SEGMENT_LEN", "max segment length")? {
            self.store.max_segment_len = len;
        }

        // Logging config
        if let Ok(level) = env::var("DOPEDB_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = parse_var("DOPEDB_LOG_JSON", "JSON flag")? {
            self.logging.json_format = json;
        }
        if let Some(timestamp) = parse_var("DOPEDB_LOG_TIMESTAMP", "timestamp flag")? {
            self.logging.with_timestamp = timestamp;
        }
        if let Some(target) = parse_var("DOPEDB_LOG_TARGET", "target flag")? {
            self.logging.with_target = target;
        }

        // Metrics config
        if let Some(enabled) = parse_var("DOPEDB_METRICS_ENABLED", "metrics flag")? {
            self.metrics.enabled = enabled;
        }
        if let Some(addr) = parse_var("DOPEDB_METRICS_BIND_ADDRESS", "metrics address")? {
            self.metrics.bind_address = addr;
        }

        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_body_bytes must be greater than 0".to_string(),
            ));
        }

        // Validate store limits
        if self.store.max_key_len == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_key_len must be greater than 0".to_string(),
            ));
        }
        if self.store.max_namespace_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_namespace_depth must be greater than 0".to_string(),
            ));
        }
        if self.store.max_segment_len == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_segment_len must be greater than 0".to_string(),
            ));
        }
        if self.store.max_value_len > self.server.max_body_bytes {
            return Err(ConfigError::ValidationFailed(format!(
                "max_value_len ({}) cannot exceed max_body_bytes ({})",
                self.store.max_value_len, self.server.max_body_bytes
            )));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        if self.metrics.enabled && self.metrics.bind_address == self.server.bind_address {
            return Err(ConfigError::ValidationFailed(
                "metrics and server cannot share a bind address".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.server.max_body_bytes = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.store.max_namespace_depth = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.store.max_value_len = config.server.max_body_bytes + 1;
        assert!(config.validate().is_err());

        config = Config::default();
        config.metrics.enabled = true;
        config.metrics.bind_address = config.server.bind_address;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = Config::default();

        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dopedb.toml");

        let mut config = Config::default();
        config.server.bind_address = "0.0.0.0:9000".parse().unwrap();
        config.store.max_key_len = 64;
        config.server.shutdown_timeout = Duration::from_secs(5);
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.server.bind_address, config.server.bind_address);
        assert_eq!(loaded.store, config.store);
        assert_eq!(loaded.server.shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[logging]\nlevel = \"warn\"\njson_format = true\nwith_timestamp = true\nwith_target = false\n").unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.logging.level, "warn");
        assert_eq!(loaded.store, StoreLimits::default());
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[server]\nshutdown_timeout = \"5s\"\n\n[store]\nmax_key_len = 64\n\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.store.max_key_len, 64);
        assert_eq!(loaded.store.max_value_len, StoreLimits::default().max_value_len);
        assert_eq!(loaded.server.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(loaded.server.bind_address, ServerConfig::default().bind_address);
        assert_eq!(loaded.logging.level, "warn");
        assert!(loaded.logging.with_timestamp);
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("DOPEDB_STORE_MAX_SEGMENT_LEN", "16");
        env::set_var("DOPEDB_SERVER_SHUTDOWN_TIMEOUT", "2s 500ms");
        let mut config = Config::default();
        let applied = config.apply_env();
        env::remove_var("DOPEDB_STORE_MAX_SEGMENT_LEN");
        env::remove_var("DOPEDB_SERVER_SHUTDOWN_TIMEOUT");

        applied.unwrap();
        assert_eq!(config.store.max_segment_len, 16);
        assert_eq!(config.server.shutdown_timeout, Duration::from_millis(2500));

        env::set_var("DOPEDB_SERVER_SHUTDOWN_TIMEOUT", "soon");
        let rejected = Config::default().apply_env();
        env::remove_var("DOPEDB_SERVER_SHUTDOWN_TIMEOUT");
        assert!(matches!(rejected, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "server = [").unwrap();
        assert!(matches!(Config::from_file(&path), Err(ConfigError::ParseError(_))));
        assert!(matches!(
            Config::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::FileReadError(_))
        ));
    }
}
