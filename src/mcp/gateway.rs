//! Bearer-token gateway in front of the streamable HTTP transport.
//!
//! The pmcp server listens on a loopback port; this axum app owns the public
//! address, answers the health endpoints itself, checks `Authorization:
//! Bearer <token>` on everything else and proxies the request through.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::task::JoinHandle;

/// Paths served without a token
const EXEMPT_PATHS: &[&str] = &["/health", "/", "/sse"];

/// Public path of the MCP endpoint
pub const MCP_PATH: &str = "/mcp";

/// Largest request body forwarded upstream
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Headers that describe a single connection and are never forwarded
const HOP_BY_HOP: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Authentication error
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing or invalid Authorization header. Use: Authorization: Bearer <token>")]
    MissingCredentials,

    #[error("Invalid authentication token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::FORBIDDEN,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Static set of accepted bearer tokens
#[derive(Debug, Clone, Default)]
pub struct TokenAuth {
    tokens: HashSet<String>,
}

impl TokenAuth {
    pub fn new(tokens: HashSet<String>) -> Self {
        Self { tokens }
    }

    /// Whether any token is configured; without tokens every request passes
    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Check the `Authorization` header
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingCredentials)?;

        if self.tokens.contains(token) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

#[derive(Clone)]
struct GatewayState {
    auth: Arc<TokenAuth>,
    upstream: Arc<str>,
    client: reqwest::Client,
}

async fn auth_middleware(
    State(state): State<GatewayState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if EXEMPT_PATHS.contains(&req.uri().path()) || !state.auth.is_enabled() {
        return Ok(next.run(req).await);
    }

    if let Err(e) = state.auth.authenticate(req.headers()) {
        tracing::warn!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
        return Err(e);
    }

    Ok(next.run(req).await)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "name": super::server::SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "MCP server for the Borealis Dataverse research data repository",
        "endpoints": { "mcp": MCP_PATH, "health": "/health" }
    }))
}

/// Map a public path onto the upstream server, which serves MCP at `/`
fn upstream_path(path_and_query: &str) -> String {
    match path_and_query.strip_prefix(MCP_PATH) {
        Some(rest) if rest.is_empty() || rest.starts_with('?') => format!("/{}", rest),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => path_and_query.to_string(),
    }
}

fn strip_headers(headers: &mut HeaderMap, extra: &[HeaderName]) {
    for name in HOP_BY_HOP.iter().chain(extra) {
        headers.remove(name);
    }
}

async fn proxy(State(state): State<GatewayState>, req: Request) -> Result<Response, StatusCode> {
    let (parts, body) = req.into_parts();
    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", state.upstream, upstream_path(path));

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    let mut headers = parts.headers;
    strip_headers(
        &mut headers,
        &[header::HOST, header::AUTHORIZATION, header::CONTENT_LENGTH],
    );

    tracing::debug!("Proxying {} {} -> {}", parts.method, parts.uri, target);
    let upstream = state
        .client
        .request(parts.method, target)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!("Upstream MCP request failed: {}", e);
            StatusCode::BAD_GATEWAY
        })?;

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    strip_headers(&mut response_headers, &[]);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

/// Build the gateway router for an upstream base URL such as `http://127.0.0.1:40123`
pub fn router(upstream: &str, auth: TokenAuth) -> Result<Router, reqwest::Error> {
    // Bodies pass through untouched, so no transparent decompression
    let client = reqwest::Client::builder()
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .build()?;

    let state = GatewayState {
        auth: Arc::new(auth),
        upstream: Arc::from(upstream.trim_end_matches('/')),
        client,
    };

    Ok(Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .fallback(proxy)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state))
}

/// Bind `addr` and serve the gateway until Ctrl+C
pub async fn start(
    addr: SocketAddr,
    upstream: &str,
    auth: TokenAuth,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    if auth.is_enabled() {
        tracing::info!(
            "Authentication enabled with {} token(s)",
            auth.token_count()
        );
    } else {
        tracing::warn!(
            "No authentication tokens configured; set AUTH_TOKENS for production use"
        );
    }

    let app = router(upstream, auth).map_err(std::io::Error::other)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!("Gateway listening on {} (MCP at {})", local, MCP_PATH);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            tracing::error!("Gateway error: {}", e);
        }
    });

    Ok((local, handle))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutting down gateway");
    }
}
