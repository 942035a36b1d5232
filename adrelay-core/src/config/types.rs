//! Configuration type definitions
//!
//! These types represent the runtime configuration for adrelay. Every field
//! has a default so the service runs without a config file, given the
//! backend URL in the environment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding the backend deployment URL
pub const DEFAULT_URL_ENV: &str = "NEXT_PUBLIC_CONVEX_URL";

/// Root configuration for adrelay
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RelayConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Backend (mutation service) configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Maximum request body size in bytes (default: 1MB)
    #[serde(default = "default_body_limit")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_size: default_body_limit(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1MB
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Explicit deployment URL, takes precedence over the environment
    #[serde(default)]
    pub url: Option<String>,

    /// Name of the environment variable holding the deployment URL
    #[serde(default = "default_url_env")]
    pub url_env: String,

    /// Value sent in the `Convex-Client` header
    #[serde(default = "default_client_id")]
    pub client_id: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            url_env: default_url_env(),
            client_id: default_client_id(),
        }
    }
}

fn default_url_env() -> String {
    DEFAULT_URL_ENV.to_string()
}

fn default_client_id() -> String {
    format!("adrelay-{}", crate::VERSION)
}

impl BackendConfig {
    /// Resolve the deployment URL.
    ///
    /// An explicit `url` wins; otherwise the variable named by `url_env`
    /// must be set and non-empty.
    pub fn resolve_url(&self) -> Result<String> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.trim().to_string());
        }

        match std::env::var(&self.url_env) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(Error::Config(format!("{} is not defined", self.url_env))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}
