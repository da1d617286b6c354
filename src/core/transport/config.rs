//! Transport configuration types.

use serde::{Deserialize, Serialize};

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,

    /// Path of the health endpoint, or `None` to route every path to the
    /// definition document.
    #[serde(default = "default_health_path")]
    pub health_path: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_cors() -> bool {
    false
}

fn default_health_path() -> Option<String> {
    Some("/health".to_string())
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: default_host(),
            enable_cors: default_cors(),
            health_path: default_health_path(),
        }
    }
}

impl HttpConfig {
    /// Create an HTTP config for the given address.
    pub fn new(port: u16, host: impl Into<String>) -> Self {
        Self {
            port,
            host: host.into(),
            ..Default::default()
        }
    }

    /// Load HTTP config from environment variables.
    pub fn from_env() -> Self {
        let port = std::env::var("UPWARD_HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let host = std::env::var("UPWARD_HTTP_HOST").unwrap_or_else(|_| default_host());
        let enable_cors = std::env::var("UPWARD_HTTP_CORS")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or_else(|_| default_cors());
        let health_path = match std::env::var("UPWARD_HEALTH_PATH") {
            Ok(path) if path.is_empty() || path == "off" => None,
            Ok(path) => Some(path),
            Err(_) => default_health_path(),
        };

        Self {
            port,
            host,
            enable_cors,
            health_path,
        }
    }

    /// The bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        format!("HTTP on {}", self.address())
    }
}
