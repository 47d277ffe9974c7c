/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Configuration structure definitions
//!
//! Defines the schema for configuration files (YAML format). The sequence
//! tree under `exec` is kept as a raw value and handed to the sequence
//! parser untouched.

use crate::core::error::Result;
use serde::Deserialize;
use serde_yml::Value;
use std::path::Path;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Cache URL cannot be empty")]
    EmptyCacheUrl,
}

/// Main configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging configuration (level, file output)
    #[serde(default)]
    pub log: LogConfig,

    /// Remote response-cache settings; omit to run without the cache
    pub cache: Option<CacheConfig>,

    /// Root of the executable command sequence
    pub exec: Value,
}

impl Config {
    /// Read and validate a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let raw = std::fs::read_to_string(path)?;
        Config::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Config> {
        let config: Config = serde_yml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// Checks the structure only; the sequence tree is validated by the
    /// parser once plugins are registered.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        match self.log.level.to_lowercase().as_str() {
            "off" | "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(ConfigError::InvalidLogLevel(self.log.level.clone())),
        }

        if let Some(cache) = &self.cache {
            if cache.url.is_empty() {
                return Err(ConfigError::EmptyCacheUrl);
            }
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level: off, trace, debug, info, warn, error
    #[serde(default = "default_level")]
    pub level: String,

    /// Optional file path for log output (in addition to console)
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> LogConfig {
        LogConfig {
            level: default_level(),
            file: None,
        }
    }
}

/// Default log level
fn default_level() -> String {
    "info".to_string()
}

/// Remote response-cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Backend connection URL, e.g. `redis://127.0.0.1:6379/0`
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use std::io::Write;

    const SAMPLE: &str = r#"
log:
  level: debug
cache:
  url: "redis://127.0.0.1:6379/0"
exec:
  - if: [private_query]
    exec: local_resolver
    else_exec: forward_upstream
"#;

    #[test]
    fn parses_full_config() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(
            config.cache.as_ref().map(|c| c.url.as_str()),
            Some("redis://127.0.0.1:6379/0")
        );
        assert!(config.exec.is_sequence());
    }

    #[test]
    fn log_defaults_to_info() {
        let config = Config::from_yaml_str("exec: noop\n").unwrap();
        assert_eq!(config.log.level, "info");
        assert!(config.cache.is_none());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = Config::from_yaml_str("log: {level: loud}\nexec: noop\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_empty_cache_url() {
        let err = Config::from_yaml_str("cache: {url: \"\"}\nexec: noop\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load("/nonexistent/chaindns.yaml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
