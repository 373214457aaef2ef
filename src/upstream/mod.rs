//! Upstream (inference backend) subsystem.
//!
//! # Data Flow
//! ```text
//! authenticated request (path + body)
//!     → forwarder.rs (POST to base_url + path, bounded deadline)
//!     → UpstreamResponse (status, headers, body)
//!     → http::response (relay to caller)
//! ```

pub mod forwarder;

pub use forwarder::{Forwarder, UpstreamError, UpstreamResponse};
