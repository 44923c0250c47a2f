//! # Outbound Request Shapes
//!
//! JSON bodies sent to the Firecrawl v1 API. Optional fields the caller did
//! not supply are left out of the body entirely rather than sent as `null`,
//! so Firecrawl applies its own defaults.

use serde::Serialize;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Default page budget for a crawl.
pub const DEFAULT_CRAWL_LIMIT: u32 = 10;

/// Formats a scrape returns when the caller does not choose.
pub const DEFAULT_SCRAPE_FORMATS: [&str; 2] = ["markdown", "html"];

/// Formats requested for every crawled page; not caller-configurable.
pub const CRAWL_PAGE_FORMATS: [&str; 2] = ["markdown", "html"];

// =============================================================================
// SEARCH
// =============================================================================

/// Body of `POST /v1/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, limit: u32) -> Self {
        Self {
            query: query.into(),
            limit,
        }
    }
}

// =============================================================================
// SCRAPE
// =============================================================================

/// Per-page scrape options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    pub only_main_content: bool,
    /// Milliseconds to wait for the page before extracting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<u64>,
    /// Milliseconds Firecrawl may spend on the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl PageOptions {
    /// Build options from tool arguments; `None` fields are omitted on the wire.
    pub fn new(
        formats: Option<Vec<String>>,
        only_main_content: bool,
        wait_for: Option<u64>,
        timeout: Option<u64>,
    ) -> Self {
        Self {
            formats,
            only_main_content,
            wait_for,
            timeout,
        }
    }
}

/// Body of `POST /v1/scrape`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeRequest {
    pub url: String,
    #[serde(flatten)]
    pub options: PageOptions,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>, options: PageOptions) -> Self {
        Self {
            url: url.into(),
            options,
        }
    }
}

// =============================================================================
// CRAWL
// =============================================================================

/// Scrape options attached to every page of a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlPageOptions {
    pub formats: Vec<String>,
}

impl Default for CrawlPageOptions {
    fn default() -> Self {
        Self {
            formats: CRAWL_PAGE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Body of `POST /v1/crawl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub url: String,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    pub scrape_options: CrawlPageOptions,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>, limit: u32, max_depth: Option<u32>) -> Self {
        Self {
            url: url.into(),
            limit,
            max_depth,
            scrape_options: CrawlPageOptions::default(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
