//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, in-flight cap, timeout, body limit)
//! - Bind server to listener
//! - Drain gracefully on the shutdown signal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::MembraneConfig;
use crate::http::handlers::{health, method_not_supported, not_found, relay_handler};
use crate::http::request::AuthSettings;
use crate::upstream::{Forwarder, UpstreamError};

/// Application state injected into handlers.
///
/// Built once at startup and never mutated, so handlers share it without
/// locking.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    auth: AuthSettings,
    forwarder: Forwarder,
    max_body_size: usize,
}

impl AppState {
    pub fn new(config: &MembraneConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            inner: Arc::new(InnerState {
                auth: AuthSettings::from_config(&config.auth),
                forwarder: Forwarder::new(&config.upstream)?,
                max_body_size: config.limits.max_body_size,
            }),
        })
    }

    pub fn auth(&self) -> &AuthSettings {
        &self.inner.auth
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.inner.forwarder
    }

    pub fn max_body_size(&self) -> usize {
        self.inner.max_body_size
    }
}

/// HTTP server for the membrane.
pub struct HttpServer {
    router: Router,
    config: MembraneConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: MembraneConfig) -> Result<Self, UpstreamError> {
        let state = AppState::new(&config)?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &MembraneConfig, state: AppState) -> Router {
        Router::new()
            .route(
                "/",
                get(health).post(relay_handler).fallback(method_not_supported),
            )
            .route(
                "/{*path}",
                post(relay_handler).get(not_found).fallback(method_not_supported),
            )
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.limits.request_timeout_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_in_flight))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &MembraneConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handlers::READINESS_BODY;
    use crate::http::request::{X_RESONANCE_SIGNATURE, X_RESONANCE_TIMESTAMP};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    fn router() -> Router {
        let mut config = MembraneConfig::default();
        // Nothing listens here; these tests never reach the forwarder.
        config.upstream.base_url = "http://127.0.0.1:9".to_string();
        config.limits.max_body_size = 16;
        let state = AppState::new(&config).unwrap();
        HttpServer::build_router(&config, state)
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_ignores_headers() {
        let response = router()
            .oneshot(
                Request::get("/")
                    .header(X_RESONANCE_SIGNATURE, "garbage")
                    .header("authorization", "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, READINESS_BODY);
    }

    #[tokio::test]
    async fn test_other_get_paths_are_not_found() {
        for path in ["/nonexistent", "/api/chat", "/health"] {
            let response = router()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_unsupported_methods() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/chat")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_post_without_credentials_is_forbidden() {
        let response = router()
            .oneshot(Request::post("/api/chat").body(Body::from("{}")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_text(response).await.contains("missing"));
    }

    #[tokio::test]
    async fn test_post_with_bad_timestamp_and_signature() {
        let response = router()
            .oneshot(
                Request::post("/")
                    .header(X_RESONANCE_SIGNATURE, "00")
                    .header(X_RESONANCE_TIMESTAMP, "later")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_text(response).await.contains("mismatch"));
    }

    #[tokio::test]
    async fn test_declared_oversize_body_rejected_early() {
        let response = router()
            .oneshot(
                Request::post("/api/chat")
                    .header("content-length", "17")
                    .body(Body::from(vec![b'x'; 17]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
