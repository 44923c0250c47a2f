//! # Firecrawl MCP Server
//!
//! Entry point for the MCP (Model Context Protocol) bridge to Firecrawl.
//!
//! Configuration comes from defaults, an optional TOML file, environment
//! variables and CLI flags (see [`firecrawl_mcp::config`]). The server
//! speaks MCP over HTTP+SSE and forwards tool calls to the Firecrawl API
//! with the caller's own API key.
//!
//! ## Usage
//!
//! ```bash
//! # Listen on 0.0.0.0:8002 (default)
//! firecrawl-mcp
//!
//! # Custom port and a self-hosted Firecrawl
//! PORT=9000 firecrawl-mcp --api-url http://localhost:3002
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // FIRECRAWL_MCP_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("FIRECRAWL_MCP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "firecrawl_mcp=info,tower_http=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Starting Firecrawl MCP SSE v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.bind_addr()
    );

    if let Err(e) = firecrawl_mcp::run_server(config).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
