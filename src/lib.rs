//! Resonance Membrane: a signature-gated reverse proxy for a local
//! inference backend.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod upstream;

pub use config::MembraneConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
