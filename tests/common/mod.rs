//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use resonance_membrane::config::{MembraneConfig, SharedSecret};
use resonance_membrane::{HttpServer, Shutdown};
use resonance_sdk::MembraneClient;
use tokio::net::TcpListener;

pub const SECRET: &str = "integration-secret";
pub const PROJECT_ID: &str = "integration-project";

/// What the backend saw for one request.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path_and_query: String,
    pub content_type: Option<String>,
    pub has_resonance_headers: bool,
    pub body: Vec<u8>,
}

/// A backend that records requests and answers via a user function.
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<Captured>>>,
}

impl MockBackend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<Captured> {
        self.last.lock().unwrap().clone()
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start a backend that always answers `status` with a JSON `body`.
pub async fn start_mock_backend(status: u16, body: &'static str) -> MockBackend {
    start_programmable_backend(move |_| async move {
        (
            StatusCode::from_u16(status).unwrap(),
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::HeaderName::from_static("x-backend"), "mock-ollama"),
            ],
            body,
        )
            .into_response()
    })
    .await
}

/// Start a programmable backend with async support.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockBackend
where
    F: Fn(Captured) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(Mutex::new(None));
    let f = Arc::new(f);

    let app = {
        let hits = hits.clone();
        let last = last.clone();
        Router::new().fallback(move |request: Request<Body>| {
            let hits = hits.clone();
            let last = last.clone();
            let f = f.clone();
            async move {
                let (parts, body) = request.into_parts();
                let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
                let captured = Captured {
                    method: parts.method.to_string(),
                    path_and_query: parts
                        .uri
                        .path_and_query()
                        .map(|pq| pq.to_string())
                        .unwrap_or_default(),
                    content_type: parts
                        .headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                    has_resonance_headers: parts.headers.contains_key("x-resonance-signature")
                        || parts.headers.contains_key("x-resonance-timestamp"),
                    body: body.to_vec(),
                };
                hits.fetch_add(1, Ordering::SeqCst);
                *last.lock().unwrap() = Some(captured.clone());
                f(captured).await
            }
        })
    };

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, hits, last }
}

/// An address where nothing is listening.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Membrane configuration pointing at `upstream_url`.
pub fn membrane_config(upstream_url: &str) -> MembraneConfig {
    let mut config = MembraneConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.auth.shared_secret = SharedSecret::new(SECRET);
    config.auth.project_id = PROJECT_ID.to_string();
    config.upstream.base_url = upstream_url.to_string();
    config
}

/// A running membrane; shuts down when dropped.
pub struct Membrane {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Membrane {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> MembraneClient {
        MembraneClient::with_client(http_client(), &self.url(), SECRET, PROJECT_ID)
    }
}

impl Drop for Membrane {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_membrane(config: MembraneConfig) -> Membrane {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Membrane { addr, shutdown }
}

/// Plain HTTP client that ignores proxy environment variables.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Current time as fractional epoch seconds, offset by `offset_secs`.
pub fn timestamp_offset(offset_secs: f64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs_f64();
    format!("{:.3}", now + offset_secs)
}
