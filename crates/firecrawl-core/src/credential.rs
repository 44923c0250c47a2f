//! # Credential Extraction
//!
//! Turns the value of an inbound `Authorization` header into a validated
//! Firecrawl API key.
//!
//! ## Accepted Shape
//!
//! ```text
//! Authorization: Bearer fc-<token>
//! ```
//!
//! The scheme is matched case-insensitively; the `fc-` prefix is not.

use crate::error::ToolError;
use std::fmt;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Authorization scheme expected in front of the token (matched case-insensitively).
pub const BEARER_SCHEME: &str = "Bearer ";

/// Literal prefix every Firecrawl API key carries.
pub const TOKEN_PREFIX: &str = "fc-";

/// Message for an absent header or one that does not use the bearer scheme.
pub const MALFORMED_HEADER: &str = "Authorization header missing or malformed";

/// Message for a bearer token that is not a Firecrawl key.
pub const INVALID_TOKEN_FORMAT: &str = "Invalid Firecrawl API token format";

// =============================================================================
// CREDENTIAL
// =============================================================================

/// A Firecrawl API key taken from a single tool call.
///
/// Never cached: each tool call extracts its own and drops it when the call
/// finishes. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Validate an `Authorization` header value.
    ///
    /// `None` means the header was absent (or not representable as text).
    pub fn from_authorization(header: Option<&str>) -> Result<Self, ToolError> {
        let token = match header {
            Some(value) if has_bearer_scheme(value) => {
                value.split_once(' ').map_or("", |(_, token)| token)
            }
            _ => return Err(ToolError::Auth(MALFORMED_HEADER.to_string())),
        };

        if !token.starts_with(TOKEN_PREFIX) {
            return Err(ToolError::Auth(INVALID_TOKEN_FORMAT.to_string()));
        }

        Ok(Self(token.to_string()))
    }

    /// The raw token, for the outbound `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({TOKEN_PREFIX}***)")
    }
}

/// Case-insensitive check for the `Bearer ` scheme.
fn has_bearer_scheme(value: &str) -> bool {
    value
        .as_bytes()
        .get(..BEARER_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(BEARER_SCHEME.as_bytes()))
}

// =============================================================================
// TESTS
// =============================================================================
