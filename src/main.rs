//! Resonance Membrane
//!
//! An authenticated reverse proxy in front of a local inference backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                  RESONANCE MEMBRANE                  │
//!                 │                                                      │
//!   POST /api/..  │  ┌────────┐   ┌───────────┐   ┌────────┐   ┌──────┐  │
//!   ──────────────┼─▶│  http  │──▶│ signature │──▶│ replay │──▶│ body │  │
//!                 │  │ server │   │  verify   │   │ window │   │limit │  │
//!                 │  └────────┘   └───────────┘   └────────┘   └──┬───┘  │
//!                 │       │ GET /                                  │      │
//!                 │       ▼                                        ▼      │
//!                 │  ┌────────┐                            ┌───────────┐  │
//!   ◀─────────────┼──│ health │          ◀─────────────────│ forwarder │◀─┼── Backend
//!                 │  └────────┘                            └───────────┘  │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use resonance_membrane::config::load_config;
use resonance_membrane::lifecycle::startup::launch;
use resonance_membrane::lifecycle::Shutdown;
use resonance_membrane::observability::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "resonance-membrane")]
#[command(about = "Signature-gated reverse proxy for a local inference backend")]
struct Args {
    /// Optional TOML configuration file; environment variables override it
    #[arg(short, long, env = "MEMBRANE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_logging(&config.observability.log_level);

    tracing::info!("resonance-membrane v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    launch(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
