//! # SSE Transport
//!
//! HTTP+SSE front-end for the MCP server, built on axum.
//!
//! ## Endpoints
//!
//! - `GET {sse_path}` - open a session; the first event (`endpoint`) names the
//!   URL to post messages to, every later event (`message`) is one JSON-RPC
//!   message from the server
//! - `POST {message_path}?session_id=<id>` - deliver one JSON-RPC message
//! - `GET /health` - liveness and open session count
//!
//! ## Sessions
//!
//! Each session runs its own clone of [`FirecrawlMcp`] over a pair of
//! channels. The HTTP request parts of every posted JSON-RPC request are
//! attached to it, so tools can read the caller's `Authorization` header.
//! Dropping the event stream removes the session, which ends the MCP service
//! and cancels its in-flight calls.
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `FIRECRAWL_MCP_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all
//!   (default: no CORS headers)

use crate::client::Backend;
use crate::config::Config;
use crate::error::ServerError;
use crate::server::FirecrawlMcp;
use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{HeaderValue, Method, StatusCode, header, request::Parts},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures::{SinkExt, Stream, StreamExt, channel::mpsc, future, stream};
use rmcp::{
    ServiceExt,
    model::{ClientJsonRpcMessage, GetExtensions, ServerJsonRpcMessage},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted JSON-RPC message body (4 MiB).
pub const MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// Buffered messages per direction per session.
const CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// SESSION TABLE
// =============================================================================

type SessionSender = mpsc::Sender<ClientJsonRpcMessage>;

/// Open sessions, keyed by session id. Holds only the inbound senders.
#[derive(Clone, Default)]
pub struct SessionTable {
    inner: Arc<RwLock<HashMap<String, SessionSender>>>,
}

impl SessionTable {
    fn insert(&self, id: String, sender: SessionSender) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, sender);
    }

    fn remove(&self, id: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    fn sender(&self, id: &str) -> Option<SessionSender> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes its session when the event stream holding it is dropped.
struct SessionGuard {
    id: String,
    sessions: SessionTable,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions.remove(&self.id);
        tracing::info!(session_id = %self.id, "SSE session closed");
    }
}

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared state of the SSE front-end.
#[derive(Clone)]
pub struct AppState {
    server: FirecrawlMcp,
    sessions: SessionTable,
    message_path: Arc<str>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(server: FirecrawlMcp, config: &Config) -> Self {
        Self {
            server,
            sessions: SessionTable::default(),
            message_path: Arc::from(config.server.message_path.as_str()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// Cancelled on shutdown; closes every open event stream.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: usize,
}

/// Health check endpoint.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions.len(),
    })
}

/// Open an SSE session and start an MCP service for it.
pub async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = uuid::Uuid::new_v4().simple().to_string();
    let (inbound_tx, inbound_rx) = mpsc::channel::<ClientJsonRpcMessage>(CHANNEL_CAPACITY);
    let (outbound_tx, outbound_rx) = mpsc::channel::<ServerJsonRpcMessage>(CHANNEL_CAPACITY);

    state.sessions.insert(session_id.clone(), inbound_tx);
    tracing::info!(session_id = %session_id, "SSE session opened");

    let server = state.server.clone();
    let task_session = session_id.clone();
    tokio::spawn(async move {
        match server.serve((outbound_tx, inbound_rx)).await {
            Ok(running) => match running.waiting().await {
                Ok(reason) => {
                    tracing::debug!(session_id = %task_session, ?reason, "MCP service stopped");
                }
                Err(e) => {
                    tracing::warn!(session_id = %task_session, error = %e, "MCP service task failed");
                }
            },
            Err(e) => {
                tracing::warn!(session_id = %task_session, error = %e, "MCP initialization failed");
            }
        }
    });

    let guard = SessionGuard {
        id: session_id.clone(),
        sessions: state.sessions.clone(),
    };
    let endpoint = format!("{}?session_id={}", state.message_path, session_id);
    let endpoint_event = Event::default().event("endpoint").data(endpoint);

    let messages = outbound_rx.filter_map(move |message| {
        let _session = &guard;
        future::ready(message_event(&message).map(Ok))
    });

    let events = stream::once(future::ready(Ok(endpoint_event)))
        .chain(messages)
        .take_until(state.shutdown.cancelled_owned());

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Session selector on the message endpoint.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

/// Deliver one client JSON-RPC message to its session.
pub async fn message_handler(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    request: Request,
) -> Result<StatusCode, (StatusCode, &'static str)> {
    let Some(mut sender) = state.sessions.sender(&query.session_id) else {
        tracing::warn!(session_id = %query.session_id, "message for unknown session");
        return Err((StatusCode::NOT_FOUND, "Unknown session"));
    };

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_MESSAGE_BYTES)
        .await
        .map_err(|_| (StatusCode::PAYLOAD_TOO_LARGE, "Message too large"))?;

    let mut message: ClientJsonRpcMessage = serde_json::from_slice(&bytes).map_err(|e| {
        tracing::warn!(session_id = %query.session_id, error = %e, "invalid JSON-RPC message");
        (StatusCode::BAD_REQUEST, "Invalid JSON-RPC message")
    })?;

    attach_request_parts(&mut message, parts);

    sender
        .send(message)
        .await
        .map_err(|_| (StatusCode::GONE, "Session closed"))?;
    Ok(StatusCode::ACCEPTED)
}

/// Make the HTTP request parts available to the tool handling this request.
fn attach_request_parts(message: &mut ClientJsonRpcMessage, parts: Parts) {
    if let ClientJsonRpcMessage::Request(request) = message {
        request.request.extensions_mut().insert(parts);
    }
}

/// Encode a server message as an SSE `message` event.
fn message_event(message: &ServerJsonRpcMessage) -> Option<Event> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Event::default().event("message").data(json)),
        Err(e) => {
            tracing::error!(error = %e, "cannot encode server message");
            None
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `FIRECRAWL_MCP_CORS_ORIGINS`:
/// - If "*": allows all origins
/// - If not set: no CORS layer (MCP clients are not browsers)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> Option<CorsLayer> {
    let origins = std::env::var("FIRECRAWL_MCP_CORS_ORIGINS").ok()?;

    if origins.trim() == "*" {
        tracing::warn!("CORS: Allowing ALL origins (FIRECRAWL_MCP_CORS_ORIGINS=*)");
        return Some(CorsLayer::permissive());
    }

    let allowed_origins: Vec<HeaderValue> = origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            match trimmed.parse::<HeaderValue>() {
                Ok(hv) => {
                    tracing::info!("CORS: Allowing origin: {}", trimmed);
                    Some(hv)
                }
                Err(e) => {
                    tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS: No valid origins in FIRECRAWL_MCP_CORS_ORIGINS, CORS disabled");
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    )
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with the SSE, message and health endpoints.
pub fn create_router(config: &Config, state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route(&config.server.sse_path, get(sse_handler))
        .route(&config.server.message_path, post(message_handler));

    if let Some(cors) = build_cors_layer() {
        router = router.layer(cors);
    }

    router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the SSE server and run until Ctrl+C or SIGTERM.
pub async fn run_server(config: Config) -> Result<(), ServerError> {
    let backend = Backend::new(&config)?;
    let state = AppState::new(FirecrawlMcp::new(backend), &config);
    let shutdown = state.shutdown_token();
    let router = create_router(&config, state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!(
        "Firecrawl MCP SSE listening on {} (events: {}, messages: {}, upstream: {})",
        addr,
        config.server.sse_path,
        config.server.message_path,
        config.api_url()
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then close every open session.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    shutdown.cancel();
}

// =============================================================================
// TESTS
// =============================================================================
