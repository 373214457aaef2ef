//! Request rejection taxonomy.
//!
//! Every rejection is local and final: nothing here is retried, and no
//! variant is fatal to the listener.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Why a request did not reach (or did not come back from) the upstream.
#[derive(Debug, Error)]
pub enum MembraneError {
    /// Signature or timestamp header absent or empty.
    #[error("disharmonic connection: missing resonance data")]
    MissingCredential,

    /// Claimed signature does not match the recomputed one.
    #[error("resonance mismatch: signature out of alignment")]
    SignatureMismatch,

    /// Timestamp is not a finite decimal number of epoch seconds.
    #[error("invalid temporal format")]
    MalformedTimestamp,

    /// Timestamp is outside the replay window.
    #[error("temporal decay: resonance expired")]
    ExpiredTimestamp,

    #[error("payload too large: limit is {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("unreadable request body: {0}")]
    UnreadableBody(String),

    /// Backend could not be reached; carries the network failure chain.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),
}

impl MembraneError {
    pub fn status(&self) -> StatusCode {
        match self {
            MembraneError::MissingCredential
            | MembraneError::SignatureMismatch
            | MembraneError::ExpiredTimestamp => StatusCode::FORBIDDEN,
            MembraneError::MalformedTimestamp | MembraneError::UnreadableBody(_) => {
                StatusCode::BAD_REQUEST
            }
            MembraneError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            MembraneError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label used for metrics and log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            MembraneError::MissingCredential => "missing_credential",
            MembraneError::SignatureMismatch => "signature_mismatch",
            MembraneError::MalformedTimestamp => "malformed_timestamp",
            MembraneError::ExpiredTimestamp => "expired_timestamp",
            MembraneError::PayloadTooLarge { .. } => "payload_too_large",
            MembraneError::UnreadableBody(_) => "unreadable_body",
            MembraneError::UpstreamUnreachable(_) => "upstream_unreachable",
        }
    }
}

impl IntoResponse for MembraneError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
