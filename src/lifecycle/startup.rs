//! Startup orchestration.
//!
//! # Responsibilities
//! - Warn loudly about development defaults
//! - Start the metrics exporter when enabled
//! - Build the server, bind the listener, serve until shutdown

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::MembraneConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::upstream::UpstreamError;

/// Fatal errors while bringing the membrane up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("upstream configuration: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Log a prominent warning for each insecure development default in use.
///
/// Returns the number of warnings emitted.
pub fn report_insecure_defaults(config: &MembraneConfig) -> usize {
    let mut warnings = 0;
    if config.auth.shared_secret.is_default() {
        tracing::warn!(
            "Using the compiled-in development shared secret. Anyone with the source can sign \
             requests; set KINETIC_SECRET before exposing this service"
        );
        warnings += 1;
    }
    warnings
}

/// Run the membrane until `shutdown` is triggered.
pub async fn launch(config: MembraneConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    report_insecure_defaults(&config);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        project_id = %config.auth.project_id,
        replay_window_secs = config.auth.replay_window_secs,
        max_in_flight = config.listener.max_in_flight,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
