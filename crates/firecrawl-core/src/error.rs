//! # Error Types
//!
//! One variant per failure category a tool call can end in.
//!
//! - `Auth` carries the validation message as-is
//! - `Search` / `Scrape` / `Crawl` carry the message of the outbound failure
//!   they wrap and render it behind a fixed prefix
//!
//! Messages are shown to the MCP caller, so they never contain a credential.

use thiserror::Error;

/// Errors a Firecrawl tool call can surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The `Authorization` header was missing, malformed, or not a Firecrawl key.
    #[error("{0}")]
    Auth(String),

    /// The outbound search call failed.
    #[error("Firecrawl search failed: {0}")]
    Search(String),

    /// The outbound scrape call failed.
    #[error("Firecrawl scrape failed: {0}")]
    Scrape(String),

    /// The outbound crawl call (or its job) failed.
    #[error("Firecrawl crawl failed: {0}")]
    Crawl(String),
}

impl ToolError {
    /// Stable category name, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth_error",
            Self::Search(_) => "search_error",
            Self::Scrape(_) => "scrape_error",
            Self::Crawl(_) => "crawl_error",
        }
    }

    /// The wrapped message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Auth(m) | Self::Search(m) | Self::Scrape(m) | Self::Crawl(m) => m,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
