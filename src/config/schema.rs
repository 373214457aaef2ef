//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the membrane.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Development-only shared secret compiled into the binary.
///
/// WARNING: anyone with the source can forge signatures against a deployment
/// that keeps this value. Override it with `KINETIC_SECRET`.
pub const DEFAULT_SHARED_SECRET: &str = "AKSHON_RESONANCE_2026";

/// Development-only project identifier.
pub const DEFAULT_PROJECT_ID: &str = "stellar-chariot-477113-j0";

/// Default tolerance for request timestamps, in seconds.
pub const DEFAULT_REPLAY_WINDOW_SECS: u64 = 30;

/// Root configuration for the membrane.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MembraneConfig {
    /// Listener configuration (bind address, in-flight cap).
    pub listener: ListenerConfig,

    /// Signature and replay settings.
    pub auth: AuthConfig,

    /// Inference backend being fronted.
    pub upstream: UpstreamConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum requests processed concurrently (backpressure).
    pub max_in_flight: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_in_flight: 1024,
        }
    }
}

/// Shared secret used as keying material for request signatures.
///
/// `Debug` is redacted so the value never leaks through config dumps.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when the compiled development default is in effect.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_SHARED_SECRET
    }
}

impl Default for SharedSecret {
    fn default() -> Self {
        Self::new(DEFAULT_SHARED_SECRET)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Signature verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret known to callers and the membrane.
    pub shared_secret: SharedSecret,

    /// Project identifier, signed but not secret.
    pub project_id: String,

    /// Accepted clock distance between caller and membrane, in seconds.
    pub replay_window_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            shared_secret: SharedSecret::default(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            replay_window_secs: DEFAULT_REPLAY_WINDOW_SECS,
        }
    }
}

/// Upstream (inference backend) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the backend, e.g. "http://localhost:11434".
    pub base_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total time allowed for one forwarded request, body included.
    pub request_timeout_secs: u64,

    /// How long idle pooled connections are kept.
    pub pool_idle_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 120,
            pool_idle_timeout_secs: 30,
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Total time for one inbound request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout_secs: 150,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = SharedSecret::new("hunter2");
        let rendered = format!("{:?}", AuthConfig {
            shared_secret: secret,
            ..AuthConfig::default()
        });
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: MembraneConfig = toml::from_str(
            r#"
            [auth]
            project_id = "demo-project"

            [upstream]
            base_url = "http://10.0.0.5:11434"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.project_id, "demo-project");
        assert!(config.auth.shared_secret.is_default());
        assert_eq!(config.auth.replay_window_secs, 30);
        assert_eq!(config.upstream.base_url, "http://10.0.0.5:11434");
        assert_eq!(config.upstream.request_timeout_secs, 120);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
