//! Route handlers.
//!
//! ```text
//! GET  /          → health (no authentication)
//! GET  /<other>   → 404
//! POST /<any>     → relay_handler:
//!     headers present? ── no ──→ 403
//!     signature match? ── no ──→ 403 (caller address logged)
//!     timestamp parses? ─ no ──→ 400
//!     within window? ──── no ──→ 403
//!     body within limit? ─ no ─→ 413
//!     forward ── network failure ─→ 502
//!             └─ any upstream status ─→ relayed verbatim
//! ```

use std::net::SocketAddr;
use std::time::{Instant, SystemTime};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::error::MembraneError;
use crate::http::request::authenticate;
use crate::http::response::relay;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::limits::read_body;

/// Fixed body of the readiness probe.
pub const READINESS_BODY: &str = "AKSHON Resonance Membrane: ONLINE";

pub async fn health() -> &'static str {
    READINESS_BODY
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

pub async fn method_not_supported() -> impl IntoResponse {
    (StatusCode::NOT_IMPLEMENTED, "unsupported method")
}

/// Authenticate a POST and relay it to the backend.
pub async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let caller = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(request_id = %request_id, caller = %caller, path = %path, "Relaying request");

    match dispatch(&state, request).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                status = %response.status(),
                "Upstream responded"
            );
            metrics::record_request(&method, response.status().as_u16(), "relayed", start);
            response
        }
        Err(err) => {
            match &err {
                MembraneError::SignatureMismatch => tracing::warn!(
                    request_id = %request_id,
                    caller = %caller,
                    "Refractory block: invalid signature"
                ),
                MembraneError::UpstreamUnreachable(detail) => tracing::error!(
                    request_id = %request_id,
                    path = %path,
                    error = %detail,
                    "Upstream unreachable"
                ),
                other => tracing::info!(
                    request_id = %request_id,
                    caller = %caller,
                    reason = other.reason(),
                    "Request rejected"
                ),
            }
            metrics::record_rejection(err.reason());
            metrics::record_request(&method, err.status().as_u16(), "rejected", start);
            err.into_response()
        }
    }
}

async fn dispatch(state: &AppState, request: Request<Body>) -> Result<Response, MembraneError> {
    authenticate(request.headers(), state.auth(), SystemTime::now())?;

    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let body = read_body(body, state.max_body_size()).await?;
    let upstream = state
        .forwarder()
        .forward(path_and_query, body)
        .await
        .map_err(|e| MembraneError::UpstreamUnreachable(e.to_string()))?;

    Ok(relay(upstream))
}
