//! Inbound request authentication.
//!
//! # Responsibilities
//! - Extract the resonance signature and timestamp headers
//! - Run the checks in a fixed order: presence, signature, replay window
//! - Map each failure to its rejection class
//!
//! # Design Decisions
//! - Signature is checked before the timestamp is parsed, so a request with
//!   a bad signature is a mismatch whatever its timestamp looks like
//! - Pure over (headers, settings, now) so the state machine is testable
//!   without a socket

use std::time::SystemTime;

use axum::http::{HeaderMap, HeaderName};

use crate::config::{AuthConfig, SharedSecret};
use crate::http::error::MembraneError;
use crate::security::{verify_signature, ReplayGuard, ReplayOutcome};

/// Header carrying the hex-encoded SHA-256 signature.
pub const X_RESONANCE_SIGNATURE: HeaderName = HeaderName::from_static("x-resonance-signature");

/// Header carrying the decimal Unix epoch timestamp that was signed.
pub const X_RESONANCE_TIMESTAMP: HeaderName = HeaderName::from_static("x-resonance-timestamp");

/// Immutable verification settings shared by all handlers.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    shared_secret: SharedSecret,
    project_id: String,
    replay: ReplayGuard,
}

impl AuthSettings {
    pub fn new(shared_secret: SharedSecret, project_id: String, replay: ReplayGuard) -> Self {
        Self {
            shared_secret,
            project_id,
            replay,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.shared_secret.clone(),
            config.project_id.clone(),
            ReplayGuard::new(std::time::Duration::from_secs(config.replay_window_secs)),
        )
    }
}

/// The two credential headers, present and non-empty.
#[derive(Debug, Clone, Copy)]
pub struct ResonanceCredentials<'a> {
    pub signature: &'a str,
    pub timestamp: &'a str,
}

impl<'a> ResonanceCredentials<'a> {
    /// Pull both headers out of `headers`.
    ///
    /// Absent or empty headers are a missing credential. A value that is not
    /// visible ASCII cannot have been produced by a signer, so it is reported
    /// as a mismatch.
    pub fn from_headers(headers: &'a HeaderMap) -> Result<Self, MembraneError> {
        let signature = headers
            .get(&X_RESONANCE_SIGNATURE)
            .filter(|v| !v.is_empty());
        let timestamp = headers
            .get(&X_RESONANCE_TIMESTAMP)
            .filter(|v| !v.is_empty());

        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            return Err(MembraneError::MissingCredential);
        };

        match (signature.to_str(), timestamp.to_str()) {
            (Ok(signature), Ok(timestamp)) => Ok(Self {
                signature,
                timestamp,
            }),
            _ => Err(MembraneError::SignatureMismatch),
        }
    }
}

/// Authenticate a request's headers at time `now`.
pub fn authenticate(
    headers: &HeaderMap,
    settings: &AuthSettings,
    now: SystemTime,
) -> Result<(), MembraneError> {
    let credentials = ResonanceCredentials::from_headers(headers)?;

    if !verify_signature(
        credentials.timestamp,
        &settings.project_id,
        settings.shared_secret.expose(),
        credentials.signature,
    ) {
        return Err(MembraneError::SignatureMismatch);
    }

    match settings.replay.check_at(credentials.timestamp, now) {
        ReplayOutcome::Valid => Ok(()),
        ReplayOutcome::Expired => Err(MembraneError::ExpiredTimestamp),
        ReplayOutcome::Malformed => Err(MembraneError::MalformedTimestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::expected_signature;
    use axum::http::HeaderValue;
    use std::time::{Duration, UNIX_EPOCH};

    const NOW: u64 = 1_700_000_000;

    fn settings() -> AuthSettings {
        AuthSettings::new(
            SharedSecret::new("top-secret"),
            "demo-project".to_string(),
            ReplayGuard::new(Duration::from_secs(30)),
        )
    }

    fn now() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(NOW)
    }

    fn signed(timestamp: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_RESONANCE_SIGNATURE,
            HeaderValue::from_str(&expected_signature(timestamp, "demo-project", "top-secret"))
                .unwrap(),
        );
        headers.insert(X_RESONANCE_TIMESTAMP, HeaderValue::from_str(timestamp).unwrap());
        headers
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(authenticate(&signed("1700000000.5"), &settings(), now()).is_ok());
    }

    #[test]
    fn test_missing_headers() {
        let mut headers = signed("1700000000");
        headers.remove(X_RESONANCE_SIGNATURE);
        assert!(matches!(
            authenticate(&headers, &settings(), now()),
            Err(MembraneError::MissingCredential)
        ));

        let mut headers = signed("1700000000");
        headers.remove(X_RESONANCE_TIMESTAMP);
        assert!(matches!(
            authenticate(&headers, &settings(), now()),
            Err(MembraneError::MissingCredential)
        ));

        let mut headers = signed("1700000000");
        headers.insert(X_RESONANCE_SIGNATURE, HeaderValue::from_static(""));
        assert!(matches!(
            authenticate(&headers, &settings(), now()),
            Err(MembraneError::MissingCredential)
        ));
    }

    #[test]
    fn test_wrong_signature_is_mismatch() {
        let mut headers = signed("1700000000");
        headers.insert(X_RESONANCE_TIMESTAMP, HeaderValue::from_static("1700000001"));
        assert!(matches!(
            authenticate(&headers, &settings(), now()),
            Err(MembraneError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_non_ascii_header_is_mismatch() {
        let mut headers = signed("1700000000");
        headers.insert(
            X_RESONANCE_SIGNATURE,
            HeaderValue::from_bytes(b"\xfe\xff").unwrap(),
        );
        assert!(matches!(
            authenticate(&headers, &settings(), now()),
            Err(MembraneError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_signature_checked_before_timestamp() {
        // Garbage timestamp with a garbage signature is a mismatch, not 400.
        let mut headers = HeaderMap::new();
        headers.insert(X_RESONANCE_SIGNATURE, HeaderValue::from_static("abc"));
        headers.insert(X_RESONANCE_TIMESTAMP, HeaderValue::from_static("soon"));
        assert!(matches!(
            authenticate(&headers, &settings(), now()),
            Err(MembraneError::SignatureMismatch)
        ));

        // Correctly signed garbage timestamp is malformed.
        assert!(matches!(
            authenticate(&signed("soon"), &settings(), now()),
            Err(MembraneError::MalformedTimestamp)
        ));
    }

    #[test]
    fn test_stale_and_future_timestamps_expire() {
        assert!(matches!(
            authenticate(&signed("1699999940"), &settings(), now()),
            Err(MembraneError::ExpiredTimestamp)
        ));
        assert!(matches!(
            authenticate(&signed("1700000031"), &settings(), now()),
            Err(MembraneError::ExpiredTimestamp)
        ));
        assert!(authenticate(&signed("1700000030"), &settings(), now()).is_ok());
    }
}
