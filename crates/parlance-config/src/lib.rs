#![deny(unsafe_code)]

//! Configuration loading and validation for Parlance.
//!
//! Loads TOML configuration files and validates them against expected
//! schemas. Provides the [`AppConfig`] type as the central configuration
//! structure, and the [`catalog`] module for declarative function/rule
//! catalogs.

/// Declarative catalog definitions (functions and recognition rules in TOML).
pub mod catalog;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogConfig;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Declarative catalog (empty = use the built-in set).
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Port the server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Value sent in `Access-Control-Allow-Origin` responses.
    #[serde(default = "default_cors_allow_origin")]
    pub cors_allow_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            cors_allow_origin: default_cors_allow_origin(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_listen_port() -> u16 {
    8088
}

fn default_cors_allow_origin() -> String {
    "*".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Shallow checks only — semantic catalog defects (unknown functions,
    /// unbound parameters) are caught when the catalog is compiled at
    /// startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_port == 0 {
            return Err(ConfigError::Validation(
                "server.listen_port must be non-zero".to_string(),
            ));
        }
        if self.server.listen_addr.is_empty() {
            return Err(ConfigError::Validation(
                "server.listen_addr must not be empty".to_string(),
            ));
        }
        if self.server.cors_allow_origin.is_empty() {
            return Err(ConfigError::Validation(
                "server.cors_allow_origin must not be empty".to_string(),
            ));
        }
        for function in &self.catalog.functions {
            if function.name.is_empty() {
                return Err(ConfigError::Validation(
                    "catalog.functions entries must have a non-empty name".to_string(),
                ));
            }
            for param in &function.params {
                if param.name.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "function '{}' declares a parameter with an empty name",
                        function.name
                    )));
                }
            }
        }
        for (i, rule) in self.catalog.rules.iter().enumerate() {
            if rule.pattern.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "catalog.rules[{i}] has an empty pattern"
                )));
            }
            if rule.function.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "catalog.rules[{i}] has an empty target function"
                )));
            }
        }
        Ok(())
    }
}
