//! Configuration loading from disk and the process environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{MembraneConfig, SharedSecret};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the shared secret.
pub const ENV_SHARED_SECRET: &str = "KINETIC_SECRET";
/// Environment variable holding the project identifier.
pub const ENV_PROJECT_ID: &str = "GCP_PROJECT_ID";
/// Environment variable holding the backend base URL.
pub const ENV_UPSTREAM_URL: &str = "OLLAMA_URL";
/// Environment variable overriding the listening port.
pub const ENV_PORT: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<MembraneConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => MembraneConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut MembraneConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.is_empty());

    if let Some(secret) = get(ENV_SHARED_SECRET) {
        config.auth.shared_secret = SharedSecret::new(secret);
    }
    if let Some(project_id) = get(ENV_PROJECT_ID) {
        config.auth.project_id = project_id;
    }
    if let Some(url) = get(ENV_UPSTREAM_URL) {
        config.upstream.base_url = url;
    }
    if let Some(port) = get(ENV_PORT) {
        let port: u16 = port.parse().map_err(|e| ConfigError::Env {
            var: ENV_PORT,
            reason: format!("{port:?} is not a port: {e}"),
        })?;
        let mut addr: SocketAddr =
            config.listener.bind_address.parse().map_err(|e| ConfigError::Env {
                var: ENV_PORT,
                reason: format!(
                    "cannot apply to bind address {:?}: {e}",
                    config.listener.bind_address
                ),
            })?;
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }

    Ok(())
}
