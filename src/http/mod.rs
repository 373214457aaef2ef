//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → handlers.rs (GET health / 404, POST relay)
//!     → request.rs (credential headers, signature, replay window)
//!     → upstream::forwarder (POST to backend)
//!     → response.rs (relay status, headers, body)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use error::MembraneError;
pub use request::{authenticate, AuthSettings, X_RESONANCE_SIGNATURE, X_RESONANCE_TIMESTAMP};
pub use server::{AppState, HttpServer};
