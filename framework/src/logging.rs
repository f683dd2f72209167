//! Structured logging with tracing
//!
//! The container emits `tracing` events as it resolves services (debug),
//! hits the singleton cache (trace) and boots providers (info). This module
//! installs a subscriber for applications that don't bring their own.

use crate::config::env::env;
use crate::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a full filter directive, e.g. `servicekit=trace`
pub const LOG_FILTER_ENV: &str = "SERVICEKIT_LOG";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: trace, debug, info, warn or error
    pub level: String,
    /// Include the event target (module path) in output
    pub with_target: bool,
}

impl LoggingConfig {
    /// Build config from environment variables
    pub fn from_env() -> Self {
        Self {
            level: env("LOG_LEVEL", "info".to_string()),
            with_target: env("LOG_TARGET", true),
        }
    }

    /// Set the level
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: true,
        }
    }
}

/// Install a global fmt subscriber
///
/// `SERVICEKIT_LOG` takes precedence over the configured level. Fails if the
/// level is invalid or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> ServiceResult<()> {
    let level = parse_level(&config.level)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .try_init()
        .map_err(|e| ServiceError::config(format!("cannot install logger: {}", e)))?;

    tracing::debug!(level = %level, "Logging initialized");
    Ok(())
}

/// Parse a level name
pub fn parse_level(level: &str) -> ServiceResult<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ServiceError::config(format!(
            "invalid log level '{}', use trace, debug, info, warn or error",
            level
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_level("warning").unwrap(), Level::WARN);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_init_rejects_invalid_level() {
        let config = LoggingConfig::default().level("loud");
        assert!(matches!(init(&config), Err(ServiceError::Config { .. })));
    }
}
