//! Client for services behind a Resonance Membrane.
//!
//! Requests are signed with `sha256(timestamp ‖ project_id ‖ secret)` and
//! sent with the `X-Resonance-Signature` / `X-Resonance-Timestamp` headers.

pub mod client;

pub use client::{ChatMessage, ChatRequest, ClientError, MembraneClient};
