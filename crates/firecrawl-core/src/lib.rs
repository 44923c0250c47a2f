//! # firecrawl-core
//!
//! The request-scoped logic of the Firecrawl MCP bridge - THE LOGIC.
//!
//! This crate knows how a tool call is turned into a Firecrawl request and how
//! a Firecrawl response is turned back into a tool result. It never talks to
//! the network itself; the `firecrawl-mcp` app owns transport and HTTP.
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - No state survives a tool call: a [`Credential`] is derived, used once
//!   and dropped
//! - Every failure is a [`ToolError`] variant, never a bare string

// =============================================================================
// MODULES
// =============================================================================

pub mod credential;
pub mod error;
pub mod request;
pub mod response;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use credential::{BEARER_SCHEME, Credential, TOKEN_PREFIX};
pub use error::ToolError;
pub use request::{
    CRAWL_PAGE_FORMATS, CrawlPageOptions, CrawlRequest, DEFAULT_CRAWL_LIMIT, DEFAULT_SCRAPE_FORMATS,
    DEFAULT_SEARCH_LIMIT, PageOptions, ScrapeRequest, SearchRequest,
};
pub use response::{CrawlStatus, api_error_message, search_results, unwrap_data};
