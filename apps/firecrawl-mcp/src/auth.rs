//! # Authentication Module
//!
//! Per-call credential extraction for Firecrawl tool calls.
//!
//! ## Usage
//!
//! Every tool call must arrive on an HTTP request carrying:
//! ```text
//! Authorization: Bearer fc-<your-firecrawl-api-key>
//! ```
//!
//! The bridge has no key of its own. Headers travel with each call inside a
//! [`CallContext`], which the tool layer builds from the HTTP request parts
//! and hands to the adapters explicitly.

use axum::http::{HeaderMap, header, request::Parts};
use firecrawl_core::{Credential, ToolError};

// =============================================================================
// CALL CONTEXT
// =============================================================================

/// Request-scoped state for one tool call: the inbound HTTP headers.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    headers: HeaderMap,
}

impl CallContext {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Build from the HTTP request parts attached to a JSON-RPC request.
    ///
    /// A call that did not come over HTTP gets an empty header map, so it
    /// fails authentication like any call without a header.
    pub fn from_parts(parts: Option<&Parts>) -> Self {
        parts
            .map(|p| Self::new(p.headers.clone()))
            .unwrap_or_default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether the call carried an `Authorization` header at all, readable or not.
    pub fn has_authorization(&self) -> bool {
        self.headers.contains_key(header::AUTHORIZATION)
    }

    /// Extract and validate this call's Firecrawl credential.
    ///
    /// Header lookup is case-insensitive. Failures are logged here, before
    /// they are returned to the caller.
    pub fn credential(&self) -> Result<Credential, ToolError> {
        let header_value = self
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        Credential::from_authorization(header_value).inspect_err(|e| {
            tracing::error!(
                event = "auth_failure",
                reason = e.message(),
                header_present = self.has_authorization(),
                "Firecrawl credential rejected"
            );
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
