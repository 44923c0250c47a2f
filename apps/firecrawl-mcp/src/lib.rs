//! # Firecrawl MCP Bridge
//!
//! Exposes Firecrawl search, scrape and crawl as MCP tools over HTTP+SSE.
//!
//! ```text
//! MCP client ──SSE──▶ transport ──▶ server (rmcp tools) ──▶ adapters ──▶ client ──HTTP──▶ Firecrawl
//!                                          │
//!                                          └─ auth: CallContext → Credential (per call)
//! ```
//!
//! The bridge stores no API key. Each tool call brings its own
//! `Authorization: Bearer fc-...` header, and each call builds its own
//! Firecrawl client handle from it.

pub mod adapters;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use auth::CallContext;
pub use client::{Backend, ClientError, FirecrawlClient};
pub use config::{Config, ConfigError};
pub use error::ServerError;
pub use server::FirecrawlMcp;
pub use transport::{AppState, HealthResponse, create_router, run_server};
