//! # Firecrawl HTTP Client
//!
//! Wrapper around the Firecrawl v1 REST API for use by the tool adapters.
//!
//! A [`FirecrawlClient`] is a short-lived handle: it is built for one tool call
//! around that call's [`Credential`] and dropped afterwards. The underlying
//! `reqwest::Client` (and its connection pool) is shared through [`Backend`].

use crate::config::Config;
use firecrawl_core::{
    CrawlRequest, CrawlStatus, Credential, ScrapeRequest, SearchRequest, api_error_message,
};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(Debug)]
pub enum ClientError {
    /// Cannot reach the Firecrawl API.
    ConnectionFailed(String),
    /// The request exceeded the configured timeout.
    Timeout,
    /// 401 Unauthorized - the API key was refused.
    Unauthorized,
    /// 402 Payment Required - the account is out of credits.
    PaymentRequired,
    /// 429 Too Many Requests.
    RateLimited,
    /// Any other unsuccessful response.
    Api(u16, String),
    /// A 2xx response whose body reports `"success": false`.
    Rejected(String),
    /// Failed to parse response body.
    Parse(String),
    /// A crawl job ended without completing.
    JobFailed(CrawlStatus),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed(url) => write!(f, "Cannot connect to Firecrawl at {url}"),
            Self::Timeout => write!(f, "Request to Firecrawl timed out"),
            Self::Unauthorized => write!(f, "Unauthorized: invalid Firecrawl API key"),
            Self::PaymentRequired => write!(f, "Payment required: insufficient Firecrawl credits"),
            Self::RateLimited => write!(f, "Rate limited: too many requests"),
            Self::Api(status, msg) => write!(f, "Firecrawl error ({status}): {msg}"),
            Self::Rejected(msg) => write!(f, "Firecrawl error: {msg}"),
            Self::Parse(msg) => write!(f, "Parse error: {msg}"),
            Self::JobFailed(status) => {
                write!(f, "Crawl job failed or was stopped. Status: {}", status.as_str())
            }
        }
    }
}

impl std::error::Error for ClientError {}

// =============================================================================
// BACKEND (shared across calls)
// =============================================================================

/// Connection pool plus endpoint settings shared by every tool call.
///
/// Holds no credential; [`Backend::client`] attaches one per call.
#[derive(Clone)]
pub struct Backend {
    http: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
}

impl Backend {
    /// Build the shared pool with the configured per-request timeout.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("firecrawl-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url().to_string(),
            poll_interval: config.crawl_poll_interval(),
        })
    }

    /// Create a client handle scoped to one call.
    pub fn client(&self, credential: Credential) -> FirecrawlClient {
        FirecrawlClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            credential,
            poll_interval: self.poll_interval,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// =============================================================================
// PER-CALL CLIENT
// =============================================================================

/// HTTP client that wraps calls to the Firecrawl REST API for one credential.
pub struct FirecrawlClient {
    http: reqwest::Client,
    base_url: String,
    credential: Credential,
    poll_interval: Duration,
}

impl FirecrawlClient {
    /// Build a request with the call's Bearer auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .request(method, &url)
            .bearer_auth(self.credential.expose())
    }

    /// Handle HTTP response: check status codes and parse JSON.
    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, ClientError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status == reqwest::StatusCode::PAYMENT_REQUIRED {
            return Err(ClientError::PaymentRequired);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api(status.as_u16(), error_text(body)));
        }

        let body = resp.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::Parse(e.to_string())
            }
        })?;
        match api_error_message(&body) {
            Some(msg) => Err(ClientError::Rejected(msg)),
            None => Ok(body),
        }
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        req.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::ConnectionFailed(format!("{}: {e}", self.base_url))
            }
        })
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ClientError> {
        let req = self.request(reqwest::Method::POST, path).json(body);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    /// POST /v1/search → raw search response.
    pub async fn search(&self, request: &SearchRequest) -> Result<Value, ClientError> {
        self.post("/v1/search", request).await
    }

    /// POST /v1/scrape → raw scrape response.
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<Value, ClientError> {
        self.post("/v1/scrape", request).await
    }

    /// POST /v1/crawl, then poll the job until it reaches a terminal state.
    ///
    /// Returns the final status record of a completed job.
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<Value, ClientError> {
        let started = self.post("/v1/crawl", request).await?;
        let job_id = started
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::Parse("crawl response has no job id".to_string()))?
            .to_string();

        tracing::debug!(job_id = %job_id, "crawl job started");

        loop {
            let status = self.crawl_status(&job_id).await?;
            match CrawlStatus::of(&status) {
                CrawlStatus::Completed => return Ok(status),
                s if s.is_terminal() => return Err(ClientError::JobFailed(s)),
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }

    /// GET /v1/crawl/{id} → crawl job status.
    pub async fn crawl_status(&self, job_id: &str) -> Result<Value, ClientError> {
        let req = self.request(reqwest::Method::GET, &format!("/v1/crawl/{job_id}"));
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }
}

/// Prefer the `error` field of a JSON error body over the raw text.
fn error_text(body: String) -> String {
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body)
}

// =============================================================================
// TESTS
// =============================================================================
