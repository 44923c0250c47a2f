//! # Firecrawl MCP CLI
//!
//! Command-line flags. Each flag overrides the matching config file entry
//! and environment variable.

use clap::Parser;
use firecrawl_mcp::{Config, ConfigError};
use std::path::PathBuf;

/// Firecrawl MCP Server
///
/// Serves firecrawl_search, firecrawl_scrape and firecrawl_crawl over MCP (SSE).
/// Callers authenticate each tool call with `Authorization: Bearer fc-...`.
#[derive(Parser, Debug)]
#[command(name = "firecrawl-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (or set FIRECRAWL_MCP_CONFIG)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to (overrides HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Firecrawl API base URL (overrides FIRECRAWL_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,
}

impl Cli {
    /// Load the layered configuration and apply these flags on top.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(api_url) = &self.api_url {
            config.firecrawl.api_url.clone_from(api_url);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
