//! # Configuration
//!
//! Layered configuration for the bridge. Later layers win:
//!
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config <path>` or `FIRECRAWL_MCP_CONFIG`)
//! 3. Environment variables
//! 4. CLI flags (applied by the caller)
//!
//! ## Environment Variables
//!
//! - `HOST` - bind address (default: `0.0.0.0`)
//! - `PORT` - bind port (default: `8002`)
//! - `FIRECRAWL_MCP_SSE_PATH` - event stream path (default: `/firecrawl_api/sse`)
//! - `FIRECRAWL_MCP_MESSAGE_PATH` - message path (default: `/firecrawl_api/messages/`)
//! - `FIRECRAWL_API_URL` - Firecrawl base URL (default: `https://api.firecrawl.dev`)
//! - `MCP_CLIENT_REQUEST_TIMEOUT` - outbound request timeout in seconds (default: `30.0`)
//! - `FIRECRAWL_CRAWL_POLL_INTERVAL_MS` - crawl status poll interval (default: `2000`)
//!
//! ## File Format
//!
//! ```toml
//! [server]
//! port = 9000
//!
//! [firecrawl]
//! api_url = "http://localhost:3002"
//! request_timeout_secs = 60.0
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "FIRECRAWL_MCP_CONFIG";

const DEFAULT_REQUEST_TIMEOUT_SECS: f64 = 30.0;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidValue {
            key,
            value: value.into(),
            reason,
        }
    }
}

// =============================================================================
// CONFIG SECTIONS
// =============================================================================

/// Where and how the SSE front-end listens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub sse_path: String,
    pub message_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8002,
            sse_path: "/firecrawl_api/sse".to_string(),
            message_path: "/firecrawl_api/messages/".to_string(),
        }
    }
}

/// How the bridge reaches Firecrawl.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FirecrawlConfig {
    pub api_url: String,
    pub request_timeout_secs: f64,
    pub crawl_poll_interval_ms: u64,
}

impl Default for FirecrawlConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.firecrawl.dev".to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            crawl_poll_interval_ms: 2000,
        }
    }
}

/// Full bridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub firecrawl: FirecrawlConfig,
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    /// Load defaults, the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file on top of the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse TOML text on top of the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("PORT", port, "expected a port number"))?;
        }
        if let Some(path) = lookup("FIRECRAWL_MCP_SSE_PATH") {
            self.server.sse_path = path;
        }
        if let Some(path) = lookup("FIRECRAWL_MCP_MESSAGE_PATH") {
            self.server.message_path = path;
        }
        if let Some(url) = lookup("FIRECRAWL_API_URL") {
            self.firecrawl.api_url = url;
        }
        if let Some(timeout) = lookup("MCP_CLIENT_REQUEST_TIMEOUT") {
            self.firecrawl.request_timeout_secs = timeout.trim().parse().map_err(|_| {
                ConfigError::invalid("MCP_CLIENT_REQUEST_TIMEOUT", timeout, "expected seconds")
            })?;
        }
        if let Some(interval) = lookup("FIRECRAWL_CRAWL_POLL_INTERVAL_MS") {
            self.firecrawl.crawl_poll_interval_ms = interval.trim().parse().map_err(|_| {
                ConfigError::invalid(
                    "FIRECRAWL_CRAWL_POLL_INTERVAL_MS",
                    interval,
                    "expected milliseconds",
                )
            })?;
        }
        Ok(())
    }

    /// Reject values the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, path) in [
            ("server.sse_path", &self.server.sse_path),
            ("server.message_path", &self.server.message_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::invalid(key, path, "must start with '/'"));
            }
        }
        if self.server.sse_path == self.server.message_path {
            return Err(ConfigError::invalid(
                "server.message_path",
                &self.server.message_path,
                "must differ from server.sse_path",
            ));
        }

        let api_url = self.firecrawl.api_url.trim_end_matches('/');
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "firecrawl.api_url",
                &self.firecrawl.api_url,
                "must be an http(s) URL",
            ));
        }

        match Duration::try_from_secs_f64(self.firecrawl.request_timeout_secs) {
            Ok(timeout) if !timeout.is_zero() => {}
            _ => {
                return Err(ConfigError::invalid(
                    "firecrawl.request_timeout_secs",
                    self.firecrawl.request_timeout_secs.to_string(),
                    "must be a positive number of seconds",
                ));
            }
        }

        if self.firecrawl.crawl_poll_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "firecrawl.crawl_poll_interval_ms",
                "0",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    // =========================================================================
    // DERIVED VALUES
    // =========================================================================

    /// `host:port` for the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Firecrawl base URL without a trailing slash.
    pub fn api_url(&self) -> &str {
        self.firecrawl.api_url.trim_end_matches('/')
    }

    /// Per-request timeout for outbound Firecrawl calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.firecrawl.request_timeout_secs)
            .unwrap_or(Duration::from_secs(30))
    }

    pub fn crawl_poll_interval(&self) -> Duration {
        Duration::from_millis(self.firecrawl.crawl_poll_interval_ms)
    }
}

// =============================================================================
// TESTS
// =============================================================================
