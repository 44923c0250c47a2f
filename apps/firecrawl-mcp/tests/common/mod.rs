//! Shared test helpers: an in-process fake of the Firecrawl v1 API.
//!
//! The fake records every request it receives (path, `Authorization` header,
//! JSON body) and answers with canned responses.

#![allow(dead_code, clippy::unwrap_used, clippy::panic)]

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use firecrawl_mcp::{Backend, CallContext, Config};
use futures::{StreamExt, stream};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request seen by the fake API.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Canned responses for each endpoint.
#[derive(Clone)]
pub struct FakeResponses {
    pub search: (StatusCode, Value),
    pub scrape: (StatusCode, Value),
    pub crawl_start: (StatusCode, Value),
    /// Returned in order by `GET /v1/crawl/{id}`; the last one repeats.
    pub crawl_statuses: Vec<Value>,
    /// Delay before `/v1/scrape` sends anything.
    pub scrape_delay: Duration,
    /// Delay between the first body byte of `/v1/scrape` and the rest.
    pub scrape_body_delay: Duration,
}

/// Where the most recent `/v1/scrape` handler got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeProgress {
    Idle,
    InFlight,
    /// The handler was dropped before it answered.
    Aborted,
    Answered,
}

impl ScrapeProgress {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::InFlight,
            2 => Self::Aborted,
            3 => Self::Answered,
            _ => Self::Idle,
        }
    }
}

/// Marks the scrape handler aborted unless it answered first.
struct InFlight(Arc<AtomicU8>);

impl Drop for InFlight {
    fn drop(&mut self) {
        let _ = self.0.compare_exchange(
            ScrapeProgress::InFlight as u8,
            ScrapeProgress::Aborted as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

impl Default for FakeResponses {
    fn default() -> Self {
        Self {
            search: (
                StatusCode::OK,
                json!({"success": true, "data": [
                    {"url": "https://a.example", "title": "A"},
                    {"url": "https://b.example", "title": "B"},
                ]}),
            ),
            scrape: (
                StatusCode::OK,
                json!({"success": true, "data": {
                    "markdown": "# Example",
                    "metadata": {"sourceURL": "https://example.com"},
                }}),
            ),
            crawl_start: (
                StatusCode::OK,
                json!({"success": true, "id": "job-1", "url": "https://api/v1/crawl/job-1"}),
            ),
            crawl_statuses: vec![
                json!({"success": true, "status": "scraping", "total": 2, "completed": 1}),
                json!({"success": true, "status": "completed", "total": 2, "completed": 2,
                       "data": [{"markdown": "# One"}, {"markdown": "# Two"}]}),
            ],
            scrape_delay: Duration::ZERO,
            scrape_body_delay: Duration::ZERO,
        }
    }
}

#[derive(Clone)]
struct FakeState {
    responses: Arc<FakeResponses>,
    recorded: Arc<Mutex<Vec<Recorded>>>,
    polls: Arc<AtomicUsize>,
    scrape_progress: Arc<AtomicU8>,
}

impl FakeState {
    fn record(&self, path: String, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.recorded.lock().unwrap().push(Recorded {
            path,
            authorization,
            body,
        });
    }
}

/// Handle on a running fake API.
pub struct FakeFirecrawl {
    pub base_url: String,
    state: FakeState,
}

impl FakeFirecrawl {
    pub async fn start(responses: FakeResponses) -> Self {
        let state = FakeState {
            responses: Arc::new(responses),
            recorded: Arc::new(Mutex::new(Vec::new())),
            polls: Arc::new(AtomicUsize::new(0)),
            scrape_progress: Arc::new(AtomicU8::new(ScrapeProgress::Idle as u8)),
        };

        let router = Router::new()
            .route("/v1/search", post(search))
            .route("/v1/scrape", post(scrape))
            .route("/v1/crawl", post(crawl_start))
            .route("/v1/crawl/{id}", get(crawl_status))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.state.recorded.lock().unwrap().clone()
    }

    pub fn recorded_at(&self, path: &str) -> Vec<Recorded> {
        self.recorded().into_iter().filter(|r| r.path == path).collect()
    }

    pub fn scrape_progress(&self) -> ScrapeProgress {
        ScrapeProgress::from_u8(self.state.scrape_progress.load(Ordering::SeqCst))
    }

    /// Wait until the scrape handler reaches `expected`; panics after 10s.
    pub async fn wait_for_scrape(&self, expected: ScrapeProgress) {
        let reached = tokio::time::timeout(Duration::from_secs(10), async {
            while self.scrape_progress() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(
            reached.is_ok(),
            "scrape handler stuck at {:?}, expected {expected:?}",
            self.scrape_progress()
        );
    }

    /// Config pointing at this fake, with a fast crawl poll.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.firecrawl.api_url = self.base_url.clone();
        config.firecrawl.crawl_poll_interval_ms = 10;
        config.firecrawl.request_timeout_secs = 5.0;
        config
    }

    pub fn backend(&self) -> Backend {
        Backend::new(&self.config()).unwrap()
    }
}

async fn search(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("/v1/search".into(), &headers, body);
    let (status, response) = state.responses.search.clone();
    (status, Json(response))
}

async fn scrape(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("/v1/scrape".into(), &headers, body);
    let progress = state.scrape_progress.clone();
    progress.store(ScrapeProgress::InFlight as u8, Ordering::SeqCst);
    let in_flight = InFlight(progress.clone());

    tokio::time::sleep(state.responses.scrape_delay).await;
    progress.store(ScrapeProgress::Answered as u8, Ordering::SeqCst);
    drop(in_flight);

    let (status, response) = state.responses.scrape.clone();
    let body_delay = state.responses.scrape_body_delay;
    if body_delay.is_zero() {
        return (status, Json(response)).into_response();
    }

    // Send one byte now and the rest after the delay.
    let text = response.to_string();
    let (head, tail) = text.split_at(1);
    let (head, tail) = (head.to_string(), tail.to_string());
    let chunks = stream::iter([Ok::<_, Infallible>(head)]).chain(stream::once(async move {
        tokio::time::sleep(body_delay).await;
        Ok(tail)
    }));
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(chunks))
        .unwrap()
}

async fn crawl_start(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("/v1/crawl".into(), &headers, body);
    let (status, response) = state.responses.crawl_start.clone();
    (status, Json(response))
}

async fn crawl_status(
    State(state): State<FakeState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    state.record(format!("/v1/crawl/{id}"), &headers, Value::Null);
    let poll = state.polls.fetch_add(1, Ordering::SeqCst);
    let statuses = &state.responses.crawl_statuses;
    let index = poll.min(statuses.len().saturating_sub(1));
    Json(statuses.get(index).cloned().unwrap_or(Value::Null))
}

/// A call context carrying the given `Authorization` value.
pub fn context_with_auth(value: &str) -> CallContext {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, value.parse().unwrap());
    CallContext::new(headers)
}
