//! Configuration management for the upward server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables or defaults.

use super::error::{Error, Result};
use super::transport::HttpConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Main configuration structure for the server.
///
/// This struct contains all configurable aspects of the server, organized
/// by concern for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Which definition document to serve and from which property.
    pub definition: DefinitionConfig,

    /// Runtime mode configuration.
    pub runtime: RuntimeConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// HTTP transport configuration.
    pub http: HttpConfig,

    /// Security and path validation configuration.
    pub security: SecurityConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server, used in logs and the health endpoint.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Configuration for the definition document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionConfig {
    /// Path to the YAML (or JSON) definition document.
    pub path: PathBuf,

    /// Root-level property resolved into the request handler.
    pub entry: String,
}

/// Whether the server runs in production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Long client-side cache lifetimes.
    Production,

    /// No client-side caching of static files.
    #[default]
    Development,
}

impl RuntimeMode {
    /// Parse a mode name. Only `production` (any case) selects production.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Runtime mode, read once at startup.
    pub mode: RuntimeMode,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Configuration for security and path validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Optional root directory for resolved paths.
    /// If None, no path restrictions are enforced.
    pub root_path: Option<PathBuf>,
}

impl Default for DefinitionConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("upward.yml"),
            entry: "handler".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "upward-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            definition: DefinitionConfig::default(),
            runtime: RuntimeConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            http: HttpConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `UPWARD_`.
    /// For example: `UPWARD_PATH`, `UPWARD_ENV`, `UPWARD_LOG_LEVEL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("UPWARD_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("UPWARD_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(with_timestamps) = std::env::var("UPWARD_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = with_timestamps.parse().unwrap_or(true);
        }

        if let Ok(path) = std::env::var("UPWARD_PATH") {
            config.definition.path = PathBuf::from(path);
        } else {
            warn!(
                "UPWARD_PATH not set - using {}",
                config.definition.path.display()
            );
        }

        if let Ok(entry) = std::env::var("UPWARD_ENTRY") {
            config.definition.entry = entry;
        }

        if let Ok(mode) = std::env::var("UPWARD_ENV") {
            config.runtime.mode = RuntimeMode::parse(&mode);
        }
        info!("Runtime mode: {:?}", config.runtime.mode);

        config.http = HttpConfig::from_env();

        if let Ok(root_path) = std::env::var("UPWARD_ROOT_PATH") {
            config.security.root_path = Some(PathBuf::from(root_path));
            info!(
                "Path security enabled: root directory set to {:?}",
                config.security.root_path
            );
        }

        config
    }

    /// Check values that cannot be defaulted.
    pub fn validate(&self) -> Result<()> {
        if self.definition.entry.trim().is_empty() {
            return Err(Error::config("definition entry property must not be empty"));
        }

        if let Some(path) = &self.http.health_path {
            if !path.starts_with('/') {
                return Err(Error::config(format!(
                    "health path must start with '/', got '{}'",
                    path
                )));
            }
        }

        Ok(())
    }
}
