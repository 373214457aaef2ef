//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the upstream URL is a plain HTTP origin
//! - Check that inbound deadlines outlive upstream deadlines
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MembraneConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::MembraneConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must not be empty")]
    Empty { field: &'static str },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("upstream.base_url: {0}")]
    InvalidUpstream(String),

    #[error(
        "limits.request_timeout_secs ({inbound}) must exceed upstream.request_timeout_secs ({upstream})"
    )]
    TimeoutOrdering { inbound: u64, upstream: u64 },
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &MembraneConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_in_flight == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_in_flight" });
    }

    if config.auth.shared_secret.expose().is_empty() {
        errors.push(ValidationError::Empty { field: "auth.shared_secret" });
    }
    if config.auth.project_id.is_empty() {
        errors.push(ValidationError::Empty { field: "auth.project_id" });
    }
    if config.auth.replay_window_secs == 0 {
        errors.push(ValidationError::Zero { field: "auth.replay_window_secs" });
    }

    if let Err(reason) = check_upstream_url(&config.upstream.base_url) {
        errors.push(ValidationError::InvalidUpstream(reason));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "upstream.connect_timeout_secs" });
    }
    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "upstream.request_timeout_secs" });
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_body_size" });
    }
    if config.limits.request_timeout_secs <= config.upstream.request_timeout_secs {
        errors.push(ValidationError::TimeoutOrdering {
            inbound: config.limits.request_timeout_secs,
            upstream: config.upstream.request_timeout_secs,
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_upstream_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("{raw:?} does not parse: {e}"))?;
    if url.scheme() != "http" {
        return Err(format!("scheme {:?} is not supported, use http", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err(format!("{raw:?} has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(format!("{raw:?} must not carry a query or fragment"));
    }
    Ok(())
}
