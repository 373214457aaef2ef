//! Forwarding of authenticated requests to the inference backend.
//!
//! # Responsibilities
//! - POST the body verbatim to `{base_url}{path_and_query}`
//! - Collect status, headers and body within a bounded deadline
//! - Report connection-level failures with their full cause chain
//!
//! # Design Decisions
//! - Any HTTP status from the backend is a successful forward; only
//!   failures to talk to it at all are errors
//! - The caller's headers are not forwarded; the backend sees
//!   `Content-Type: application/json` only
//! - Pooled client, but no state outlives a single request

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::observability::metrics;

/// Errors that mean the backend could not be reached or read.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Base URL plus request path does not form a valid URI.
    #[error("invalid upstream target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Connect, send or receive failure.
    #[error("{0}")]
    Network(String),

    /// The backend did not answer within the deadline.
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Everything the backend sent back.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Relays request bodies to one fixed backend.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    timeout: Duration,
}

impl Forwarder {
    /// Build a forwarder from validated upstream settings.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        // Fail at startup rather than on the first request.
        join_target(&base_url, "/")?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        connector.set_nodelay(true);

        // Idle eviction only runs when the pool has a timer.
        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .build(connector);

        Ok(Self {
            client,
            base_url,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward `body` to the backend under `path_and_query`.
    pub async fn forward(
        &self,
        path_and_query: &str,
        body: Bytes,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let uri = join_target(&self.base_url, path_and_query)?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(body))
            .map_err(|e| UpstreamError::InvalidTarget {
                target: path_and_query.to_string(),
                reason: e.to_string(),
            })?;

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.exchange(request)).await;
        metrics::record_upstream_duration(start);

        match result {
            Ok(response) => response,
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        }
    }

    async fn exchange(&self, request: Request<Full<Bytes>>) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| UpstreamError::Network(describe(&e)))?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| UpstreamError::Network(describe(&e)))?
            .to_bytes();

        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

/// Append the inbound path (and query) to the base URL.
fn join_target(base_url: &str, path_and_query: &str) -> Result<Uri, UpstreamError> {
    let target = format!("{base_url}{path_and_query}");
    target
        .parse::<Uri>()
        .map_err(|e| UpstreamError::InvalidTarget {
            target: target.clone(),
            reason: e.to_string(),
        })
}

/// Render an error with its whole cause chain, e.g.
/// `client error (Connect): tcp connect error: Connection refused (os error 111)`.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
