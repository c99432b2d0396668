//! Configuration loading from disk and the environment.
//!
//! Precedence, lowest first: built-in defaults, TOML file, environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Optional path to a TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "STATIC_GATE_CONFIG";
/// Overrides `secret_key`.
pub const SECRET_KEY_ENV: &str = "SECRET_KEY";
/// Overrides `auth.admin_password`.
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
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

/// Parse a TOML document; missing fields fall back to defaults.
pub fn parse_config(content: &str) -> Result<GateConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read and parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides. `lookup` stands in for `std::env::var`.
pub fn apply_env_overrides<F>(config: &mut GateConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret) = lookup(SECRET_KEY_ENV).filter(|v| !v.is_empty()) {
        config.secret_key = secret;
    }
    if let Some(password) = lookup(ADMIN_PASSWORD_ENV) {
        config.auth.admin_password = password;
    }
}

/// Build the effective configuration: optional file, then environment.
///
/// Validation runs once, on the merged result.
pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<GateConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => GateConfig::default(),
    };

    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the configuration from the process environment.
pub fn load_from_env() -> Result<GateConfig, ConfigError> {
    let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    load(path.as_deref(), |key| std::env::var(key).ok())
}
