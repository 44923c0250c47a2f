//! # Server Errors
//!
//! Failures that stop the bridge from starting or serving. Tool-call failures
//! are not here; they are [`firecrawl_core::ToolError`] results.

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot build Firecrawl HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Bind failed on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}
