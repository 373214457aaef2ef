//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! compiled defaults
//!     → loader.rs (optional TOML file, then environment overrides)
//!     → validation.rs (semantic checks)
//!     → MembraneConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AuthConfig;
pub use schema::LimitsConfig;
pub use schema::ListenerConfig;
pub use schema::MembraneConfig;
pub use schema::ObservabilityConfig;
pub use schema::SharedSecret;
pub use schema::UpstreamConfig;
