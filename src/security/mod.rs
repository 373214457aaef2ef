//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming POST:
//!     → signature.rs (recompute SHA-256 over timestamp ‖ project ‖ secret)
//!     → replay.rs (timestamp within the symmetric window)
//!     → limits.rs (bounded body read)
//!     → Pass to upstream forwarder
//! ```
//!
//! # Design Decisions
//! - Pure functions: no I/O, no shared state, trivially concurrent
//! - Fail closed: reject on any check failure
//! - Never log the secret or the expected signature

pub mod limits;
pub mod replay;
pub mod signature;

pub use replay::{ReplayGuard, ReplayOutcome};
pub use signature::{expected_signature, verify_signature};
