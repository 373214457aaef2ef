//! Metrics collection and exposition.
//!
//! # Metrics
//! - `membrane_requests_total` (counter): requests by method and outcome
//! - `membrane_rejections_total` (counter): rejections by reason
//! - `membrane_request_duration_seconds` (histogram): end-to-end latency
//! - `membrane_upstream_duration_seconds` (histogram): time spent on the backend
//!
//! Recording is a no-op until a recorder is installed, so tests and
//! metrics-disabled deployments pay almost nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    counter!(
        "membrane_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("membrane_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a rejected request by reason.
pub fn record_rejection(reason: &'static str) {
    counter!("membrane_rejections_total", "reason" => reason).increment(1);
}

/// Record time spent waiting on the backend.
pub fn record_upstream_duration(start: Instant) {
    histogram!("membrane_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}
