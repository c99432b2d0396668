//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file, then SECRET_KEY / ADMIN_PASSWORD)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → shared via AppState to the request pipeline
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, load_from_env, read_config, ConfigError};
pub use schema::{
    AuthConfig, GateConfig, HeadersConfig, LimitsConfig, ListenerConfig, ObservabilityConfig,
    StaticFilesConfig, TimeoutConfig, UserEntry,
};
pub use validation::{validate_config, ValidationError};
