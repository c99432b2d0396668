//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check that stored password hashes and header values are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use argon2::password_hash::PasswordHash;
use axum::http::HeaderValue;

use crate::config::schema::GateConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("static_files.{0} must not be empty")]
    EmptyStaticPath(&'static str),

    #[error("auth.realm must not be empty")]
    EmptyRealm,

    #[error("auth.realm must not contain double quotes")]
    QuotedRealm,

    #[error("auth.max_concurrent_verifications must be greater than zero")]
    ZeroVerificationLimit,

    #[error("auth.admin_username must not be empty")]
    EmptyAdminUsername,

    #[error("username `{0}` must not be empty or contain ':'")]
    InvalidUsername(String),

    #[error("username `{0}` is defined more than once")]
    DuplicateUser(String),

    #[error("password hash for `{0}` is not a valid PHC string")]
    InvalidPasswordHash(String),

    #[error("headers.{0} is not a valid header value")]
    InvalidHeaderValue(&'static str),
}

/// Validate a parsed configuration, returning every problem found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.static_files.root.is_empty() {
        errors.push(ValidationError::EmptyStaticPath("root"));
    }
    if config.static_files.index_file.is_empty() {
        errors.push(ValidationError::EmptyStaticPath("index_file"));
    }

    validate_auth(config, &mut errors);
    validate_headers(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_auth(config: &GateConfig, errors: &mut Vec<ValidationError>) {
    let auth = &config.auth;

    if auth.enabled {
        if auth.realm.is_empty() {
            errors.push(ValidationError::EmptyRealm);
        }
        if auth.admin_username.is_empty() {
            errors.push(ValidationError::EmptyAdminUsername);
        }
    }
    if auth.max_concurrent_verifications == 0 {
        errors.push(ValidationError::ZeroVerificationLimit);
    }
    if auth.realm.contains('"') {
        errors.push(ValidationError::QuotedRealm);
    }
    if auth.admin_username.contains(':') {
        errors.push(ValidationError::InvalidUsername(auth.admin_username.clone()));
    }

    // Users are checked even while auth is disabled.
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(auth.admin_username.as_str());

    for user in &auth.users {
        if user.username.is_empty() || user.username.contains(':') {
            errors.push(ValidationError::InvalidUsername(user.username.clone()));
        }
        if !seen.insert(user.username.as_str()) {
            errors.push(ValidationError::DuplicateUser(user.username.clone()));
        }
        if PasswordHash::new(&user.password_hash).is_err() {
            errors.push(ValidationError::InvalidPasswordHash(user.username.clone()));
        }
    }
}

fn validate_headers(config: &GateConfig, errors: &mut Vec<ValidationError>) {
    let headers = &config.headers;
    let fields = [
        ("frame_options", &headers.frame_options),
        ("permissions_policy", &headers.permissions_policy),
        ("content_security_policy", &headers.content_security_policy),
    ];
    for (name, value) in fields {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeaderValue(name));
        }
    }
    if HeaderValue::from_str(&format!("Basic realm=\"{}\"", config.auth.realm)).is_err() {
        errors.push(ValidationError::InvalidHeaderValue("realm"));
    }
}
