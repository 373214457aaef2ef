//! Request body limits.
//!
//! # Responsibilities
//! - Read inbound bodies with an upper bound on size
//! - Distinguish an oversize body (413) from a broken one (400)
//!
//! # Design Decisions
//! - Bodies are read only after authentication succeeds
//! - `RequestBodyLimitLayer` rejects oversize `Content-Length` early;
//!   chunked bodies are caught here while reading

use std::error::Error as StdError;

use axum::body::{Body, Bytes};
use http_body_util::LengthLimitError;

use crate::http::error::MembraneError;

/// Read the whole body, failing once it exceeds `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, MembraneError> {
    axum::body::to_bytes(body, limit).await.map_err(|err| {
        if is_length_limit(&err) {
            MembraneError::PayloadTooLarge { limit }
        } else {
            MembraneError::UnreadableBody(err.to_string())
        }
    })
}

/// Walk the source chain looking for a body length limit violation.
pub fn is_length_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
