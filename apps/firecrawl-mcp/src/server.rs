//! # Firecrawl MCP Server
//!
//! Implements `ServerHandler` with the three Firecrawl tools. Tool names are
//! part of the wire contract: `firecrawl_search`, `firecrawl_scrape`,
//! `firecrawl_crawl`.

use crate::adapters;
use crate::auth::CallContext;
use crate::client::Backend;
use axum::http::request::Parts;
use firecrawl_core::{
    DEFAULT_CRAWL_LIMIT, DEFAULT_SCRAPE_FORMATS, DEFAULT_SEARCH_LIMIT, PageOptions, ToolError,
};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

// =============================================================================
// MCP SERVER
// =============================================================================

/// MCP server that bridges to the Firecrawl HTTP API.
///
/// Cheap to clone: one clone serves each SSE session.
#[derive(Clone)]
pub struct FirecrawlMcp {
    backend: Backend,
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

// =============================================================================
// TOOL PARAMETER STRUCTS
// =============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct SearchParams {
    /// The search query to run.
    #[schemars(description = "The search query to run")]
    pub query: String,
    /// Maximum number of results (default: 5).
    #[serde(default = "default_search_limit")]
    #[schemars(description = "Maximum number of results to return (default: 5)")]
    pub limit: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct ScrapeParams {
    /// The page to scrape.
    #[schemars(description = "The target URL to scrape")]
    pub url: String,
    /// Output formats; `null` lets Firecrawl pick its own default.
    #[serde(default = "default_scrape_formats")]
    #[schemars(description = "Formats to return (default: [\"markdown\", \"html\"])")]
    pub formats: Option<Vec<String>>,
    #[serde(default = "default_true")]
    #[schemars(description = "Only return the main content of the page (default: true)")]
    pub only_main_content: bool,
    #[serde(default)]
    #[schemars(description = "Milliseconds to wait for the page to load before scraping")]
    pub wait_for: Option<u64>,
    #[serde(default)]
    #[schemars(description = "Maximum scraping duration in milliseconds")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct CrawlParams {
    /// Where the crawl starts.
    #[schemars(description = "The starting URL for the crawl")]
    pub url: String,
    #[serde(default = "default_crawl_limit")]
    #[schemars(description = "Maximum number of pages to crawl (default: 10)")]
    pub limit: u32,
    #[serde(default)]
    #[schemars(description = "Maximum link depth to follow (default: Firecrawl's own)")]
    pub max_depth: Option<u32>,
}

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

fn default_crawl_limit() -> u32 {
    DEFAULT_CRAWL_LIMIT
}

fn default_scrape_formats() -> Option<Vec<String>> {
    Some(DEFAULT_SCRAPE_FORMATS.iter().map(|f| f.to_string()).collect())
}

fn default_true() -> bool {
    true
}

// =============================================================================
// TOOL IMPLEMENTATIONS
// =============================================================================

#[tool_router]
impl FirecrawlMcp {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Search the web with Firecrawl and return a list of result records")]
    async fn firecrawl_search(
        &self,
        params: Parameters<SearchParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let SearchParams { query, limit } = params.0;
        let ctx = call_context(&context);
        let outcome = until_cancelled(
            &context.ct,
            "firecrawl_search",
            adapters::search(&ctx, &self.backend, &query, limit),
        )
        .await?;
        Ok(tool_result(outcome.map(Value::Array)))
    }

    #[tool(
        description = "Scrape a web page with Firecrawl and return its content in the requested formats"
    )]
    async fn firecrawl_scrape(
        &self,
        params: Parameters<ScrapeParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let ScrapeParams {
            url,
            formats,
            only_main_content,
            wait_for,
            timeout,
        } = params.0;
        let options = PageOptions::new(formats, only_main_content, wait_for, timeout);
        let ctx = call_context(&context);
        let outcome = until_cancelled(
            &context.ct,
            "firecrawl_scrape",
            adapters::scrape(&ctx, &self.backend, &url, options),
        )
        .await?;
        Ok(tool_result(outcome))
    }

    #[tool(
        description = "Crawl a website from a starting URL with Firecrawl and return the scraped pages with metadata"
    )]
    async fn firecrawl_crawl(
        &self,
        params: Parameters<CrawlParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let CrawlParams {
            url,
            limit,
            max_depth,
        } = params.0;
        let ctx = call_context(&context);
        let outcome = until_cancelled(
            &context.ct,
            "firecrawl_crawl",
            adapters::crawl(&ctx, &self.backend, &url, limit, max_depth),
        )
        .await?;
        Ok(tool_result(outcome))
    }
}

// =============================================================================
// SERVER HANDLER
// =============================================================================

#[tool_handler]
impl ServerHandler for FirecrawlMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Call firecrawl_search, firecrawl_scrape, or firecrawl_crawl. \
                 Supply your Firecrawl API key as 'Authorization: Bearer fc-...' header."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// =============================================================================
// CALL PLUMBING
// =============================================================================

/// Headers of the HTTP request that delivered this call.
fn call_context(context: &RequestContext<RoleServer>) -> CallContext {
    CallContext::from_parts(context.extensions.get::<Parts>())
}

/// Run an adapter until it finishes or the request is cancelled.
///
/// Cancellation drops the adapter future, which aborts the outbound request.
async fn until_cancelled<T>(
    ct: &CancellationToken,
    tool: &'static str,
    call: impl Future<Output = T>,
) -> Result<T, McpError> {
    tokio::select! {
        outcome = call => Ok(outcome),
        () = ct.cancelled() => {
            tracing::info!(tool, "tool call cancelled, outbound request abandoned");
            Err(McpError::internal_error(format!("{tool} cancelled"), None))
        }
    }
}

/// Map an adapter outcome onto an MCP tool result.
///
/// Failures become error results (`isError: true`) carrying the wrapped message.
pub fn tool_result(outcome: Result<Value, ToolError>) -> CallToolResult {
    match outcome {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            CallToolResult::success(vec![Content::text(text)])
        }
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "tool call failed");
            CallToolResult::error(vec![Content::text(e.to_string())])
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
