//! # Response Normalization
//!
//! Firecrawl wraps most payloads in a `{"success": .., "data": ..}` envelope.
//! These helpers peel that envelope off and classify crawl job states without
//! otherwise touching the payload.

use serde_json::Value;

/// Turn a search response into a list of result records.
///
/// Uses the `data` field when present, otherwise the response itself.
/// Empty values (`null`, `false`, `0`, `""`, `{}`) become an empty list; any
/// other lone non-list value becomes a list of one.
pub fn search_results(body: Value) -> Vec<Value> {
    let results = match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    match results {
        Value::Array(items) => items,
        empty if is_empty_value(&empty) => Vec::new(),
        single => vec![single],
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
    }
}

/// Strip the `data` envelope from a scrape response, if there is one.
pub fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Error message for a body that reports `"success": false`.
///
/// Returns `None` for anything that does not explicitly report failure.
pub fn api_error_message(body: &Value) -> Option<String> {
    if body.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("request was not successful");
    Some(message.to_string())
}

// =============================================================================
// CRAWL JOB STATUS
// =============================================================================

/// State of an asynchronous crawl job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    /// Still running (also used for states this bridge does not know).
    Scraping,
    Completed,
    Failed,
    Cancelled,
}

impl CrawlStatus {
    /// Read the `status` field of a crawl status response.
    pub fn of(body: &Value) -> Self {
        match body.get("status").and_then(Value::as_str) {
            Some("completed") => Self::Completed,
            Some("failed") => Self::Failed,
            Some("cancelled") => Self::Cancelled,
            _ => Self::Scraping,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Scraping)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scraping => "scraping",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
