//! Logging subsystem for dopedb
//!
//! Thin setup layer over `tracing-subscriber`. `RUST_LOG` takes precedence
//! over the configured level when it is set.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod level;

pub use error::LoggingError;
pub use level::LogLevel;

/// Configuration for the logging subsystem
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// The minimum log level to display
    pub level: LogLevel,
    /// Whether to include timestamps
    pub with_timestamp: bool,
    /// Whether to include target module information
    pub with_target: bool,
    /// Whether to use JSON formatting
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            with_timestamp: true,
            with_target: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Create a new LogConfig with specified level
    pub fn new(level: LogLevel) -> Self {
        Self { level, ..Default::default() }
    }

    /// Build from the `[logging]` section of the application config
    pub fn from_config(config: &LoggingConfig) -> Result<Self, LoggingError> {
        Ok(Self {
            level: config.level.parse()?,
            with_timestamp: config.with_timestamp,
            with_target: config.with_target,
            json_format: config.json_format,
        })
    }

    /// Set whether to include timestamps
    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.with_timestamp = enabled;
        self
    }

    /// Set whether to include target information
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Set whether to use JSON formatting
    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }
}

/// Initialize the logging subsystem with default configuration
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(LogConfig::default())
}

/// Initialize the logging subsystem with custom configuration
///
/// # Example
/// ```
/// use dopedb_core::logging::{init_logging_with_config, LogConfig, LogLevel};
///
/// let config = LogConfig::new(LogLevel::Debug)
///     .with_timestamp(false)
///     .with_target(false);
///
/// init_logging_with_config(config).expect("Failed to initialize logging");
/// ```
pub fn init_logging_with_config(config: LogConfig) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    // Exactly one of these is Some; Option<Layer> is itself a layer.
    let json_layer = config
        .json_format
        .then(|| fmt::layer().json().with_target(config.with_target));
    let timed_layer = (!config.json_format && config.with_timestamp)
        .then(|| fmt::layer().with_target(config.with_target));
    let untimed_layer = (!config.json_format && !config.with_timestamp)
        .then(|| fmt::layer().with_target(config.with_target).without_time());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(timed_layer)
        .with(untimed_layer)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.with_timestamp);
        assert!(config.with_target);
        assert!(!config.json_format);
    }

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new(LogLevel::Debug)
            .with_timestamp(false)
            .with_target(false)
            .json_format(true);

        assert_eq!(config.level, LogLevel::Debug);
        assert!(!config.with_timestamp);
        assert!(!config.with_target);
        assert!(config.json_format);
    }

    #[test]
    fn test_from_app_config() {
        let mut section = LoggingConfig::default();
        section.level = "warn".to_string();
        section.json_format = true;

        let config = LogConfig::from_config(&section).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert!(config.json_format);

        section.level = "chatty".to_string();
        assert!(LogConfig::from_config(&section).is_err());
    }

    #[test]
    fn test_second_init_fails() {
        // Whichever call wins the global slot, the other must report failure.
        let first = init_logging_with_config(LogConfig::new(LogLevel::Error));
        let second = init_logging_with_config(LogConfig::new(LogLevel::Error));
        assert!(first.is_err() || second.is_err());
    }
}
