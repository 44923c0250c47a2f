//! # Tool Adapters
//!
//! One function per Firecrawl tool. Each takes the call's [`CallContext`]
//! explicitly, extracts its own credential, builds a client handle for that
//! credential alone, and maps any outbound failure to its [`ToolError`]
//! variant. Nothing here retries or falls back.

use crate::auth::CallContext;
use crate::client::Backend;
use firecrawl_core::{
    CrawlRequest, PageOptions, ScrapeRequest, SearchRequest, ToolError, search_results,
    unwrap_data,
};
use serde_json::Value;

/// Number of search results echoed to the log.
const SEARCH_PREVIEW_LEN: usize = 3;

// =============================================================================
// SEARCH
// =============================================================================

/// Search the web through Firecrawl.
pub async fn search(
    ctx: &CallContext,
    backend: &Backend,
    query: &str,
    limit: u32,
) -> Result<Vec<Value>, ToolError> {
    let credential = ctx.credential()?;
    tracing::info!(query, limit, "firecrawl_search");

    let client = backend.client(credential);
    let response = client
        .search(&SearchRequest::new(query, limit))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, debug = ?e, "firecrawl_search failed");
            ToolError::Search(e.to_string())
        })?;

    let results = search_results(response);
    tracing::info!(count = results.len(), "search returned results");
    for (i, item) in results.iter().take(SEARCH_PREVIEW_LEN).enumerate() {
        tracing::info!(index = i + 1, result = %item, "search result preview");
    }
    Ok(results)
}

// =============================================================================
// SCRAPE
// =============================================================================

/// Scrape a single page.
pub async fn scrape(
    ctx: &CallContext,
    backend: &Backend,
    url: &str,
    options: PageOptions,
) -> Result<Value, ToolError> {
    let credential = ctx.credential()?;
    tracing::info!(
        url,
        formats = ?options.formats,
        only_main_content = options.only_main_content,
        wait_for = ?options.wait_for,
        timeout = ?options.timeout,
        "firecrawl_scrape"
    );

    let client = backend.client(credential);
    client
        .scrape(&ScrapeRequest::new(url, options))
        .await
        .map(unwrap_data)
        .map_err(|e| {
            tracing::error!(error = %e, debug = ?e, "firecrawl_scrape failed");
            ToolError::Scrape(e.to_string())
        })
}

// =============================================================================
// CRAWL
// =============================================================================

/// Crawl a site and wait for the job to finish.
pub async fn crawl(
    ctx: &CallContext,
    backend: &Backend,
    url: &str,
    limit: u32,
    max_depth: Option<u32>,
) -> Result<Value, ToolError> {
    let credential = ctx.credential()?;
    tracing::info!(url, limit, max_depth = ?max_depth, "firecrawl_crawl");

    let client = backend.client(credential);
    client
        .crawl(&CrawlRequest::new(url, limit, max_depth))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, debug = ?e, "firecrawl_crawl failed");
            ToolError::Crawl(e.to_string())
        })
}
