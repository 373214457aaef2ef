//! Response relay.
//!
//! # Responsibilities
//! - Turn the backend's response into the caller's response unchanged:
//!   same status, same end-to-end headers, same body bytes
//! - Drop hop-by-hop headers, which describe the backend connection
//!   rather than the message
//!
//! # Design Decisions
//! - The body has been collected, so framing headers such as
//!   `transfer-encoding` no longer apply and hyper re-frames it

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName},
    response::Response,
};

use crate::upstream::UpstreamResponse;

/// Headers meaningful only for a single transport hop (RFC 9110 §7.6.1).
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

fn end_to_end(headers: HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::with_capacity(headers.len());
    let mut current: Option<HeaderName> = None;
    for (name, value) in headers {
        if let Some(name) = name {
            current = Some(name);
        }
        if let Some(name) = current.as_ref().filter(|n| !is_hop_by_hop(n)) {
            relayed.append(name.clone(), value);
        }
    }
    relayed
}

/// Build the caller-facing response from what the backend returned.
pub fn relay(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = end_to_end(upstream.headers);
    response
}
