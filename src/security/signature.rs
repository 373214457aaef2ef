//! Resonance signature construction and verification.
//!
//! The signed message is `timestamp ‖ project_id ‖ secret` with no
//! delimiters, hashed with SHA-256 and hex-encoded in lowercase. The
//! timestamp is used exactly as the caller sent it in the header, so
//! `"1700000000"` and `"1700000000.0"` sign differently.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of a hex-encoded SHA-256 digest.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Compute the signature a caller must present for `timestamp`.
pub fn expected_signature(timestamp: &str, project_id: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(project_id.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a claimed signature against the expected one.
///
/// The comparison runs in constant time with respect to the content. Any
/// malformed claim (empty, wrong length, uppercase, non-hex) is simply a
/// mismatch.
pub fn verify_signature(timestamp: &str, project_id: &str, secret: &str, claimed: &str) -> bool {
    if claimed.len() != SIGNATURE_HEX_LEN {
        return false;
    }
    let expected = expected_signature(timestamp, project_id, secret);
    expected.as_bytes().ct_eq(claimed.as_bytes()).into()
}
