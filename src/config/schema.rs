//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Placeholder password for the built-in user when `ADMIN_PASSWORD` is unset.
pub const DEFAULT_ADMIN_PASSWORD: &str = "change_me_in_production";

/// Root configuration for the static gate.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Signing key reserved for session support (`SECRET_KEY`).
    #[serde(skip_serializing)]
    pub secret_key: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where the front-end assets live.
    pub static_files: StaticFilesConfig,

    /// Basic authentication settings.
    pub auth: AuthConfig,

    /// Security response headers.
    pub headers: HeadersConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            secret_key: generate_secret_key(),
            listener: ListenerConfig::default(),
            static_files: StaticFilesConfig::default(),
            auth: AuthConfig::default(),
            headers: HeadersConfig::default(),
            limits: LimitsConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("secret_key", &"<redacted>")
            .field("listener", &self.listener)
            .field("static_files", &self.static_files)
            .field("auth", &self.auth)
            .field("headers", &self.headers)
            .field("limits", &self.limits)
            .field("timeouts", &self.timeouts)
            .field("observability", &self.observability)
            .finish()
    }
}

/// 16 random bytes, hex encoded.
pub fn generate_secret_key() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Static asset location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory served under `/static/`.
    pub root: String,

    /// File served for `/`, relative to `root`.
    pub index_file: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: "static".to_string(),
            index_file: "index.html".to_string(),
        }
    }
}

/// Basic authentication configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Require credentials for every route.
    pub enabled: bool,

    /// Realm sent in the `WWW-Authenticate` challenge.
    pub realm: String,

    /// Name of the built-in user.
    pub admin_username: String,

    /// Plaintext password of the built-in user (`ADMIN_PASSWORD`).
    /// Hashed once at startup and never kept in plaintext past that point.
    #[serde(skip_serializing)]
    pub admin_password: String,

    /// Additional users with pre-computed Argon2 hashes.
    pub users: Vec<UserEntry>,

    /// Upper bound on Argon2 verifications running at once. Each one holds
    /// roughly 19 MiB of working memory.
    pub max_concurrent_verifications: usize,
}

impl AuthConfig {
    /// Whether the built-in user still has the placeholder password.
    pub fn uses_default_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            realm: "Login Required".to_string(),
            admin_username: "admin".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            users: Vec::new(),
            max_concurrent_verifications: 4,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("realm", &self.realm)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("users", &self.users)
            .field(
                "max_concurrent_verifications",
                &self.max_concurrent_verifications,
            )
            .finish()
    }
}

/// A user whose password is stored as a PHC hash string.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserEntry {
    pub username: String,
    pub password_hash: String,
}

/// Security response header configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeadersConfig {
    /// `X-Frame-Options` value.
    pub frame_options: String,

    /// `Permissions-Policy` value.
    pub permissions_policy: String,

    /// `Content-Security-Policy` value.
    pub content_security_policy: String,

    /// Send `Cache-Control`, `Pragma` and `Expires` no-cache directives.
    pub no_cache: bool,

    /// Send wildcard CORS headers.
    pub permissive_cors: bool,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            frame_options: "SAMEORIGIN".to_string(),
            permissions_policy: "geolocation=(), camera=(), microphone=()".to_string(),
            content_security_policy: "default-src 'self'; script-src 'self'; \
                style-src 'self' 'unsafe-inline'; img-src 'self' data: blob:; \
                media-src 'self' blob:; connect-src 'self'"
                .to_string(),
            no_cache: true,
            permissive_cors: false,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_canonical_policy() {
        let config = GateConfig::default();
        assert!(config.auth.enabled);
        assert!(config.headers.no_cache);
        assert!(!config.headers.permissive_cors);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.limits.max_body_bytes, 16 * 1024 * 1024);
        assert!(config.auth.uses_default_password());
        assert_eq!(config.auth.max_concurrent_verifications, 4);
    }

    #[test]
    fn test_default_secret_key_is_random_hex() {
        let a = generate_secret_key();
        let b = generate_secret_key();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_csp_default_is_exact_policy() {
        assert_eq!(
            HeadersConfig::default().content_security_policy,
            "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; \
             img-src 'self' data: blob:; media-src 'self' blob:; connect-src 'self'"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = GateConfig::default();
        config.secret_key = "0123456789abcdef-secret".into();
        config.auth.admin_password = "hunter2-admin".into();

        for printed in [format!("{:?}", config), format!("{:?}", config.auth)] {
            assert!(!printed.contains("0123456789abcdef-secret"));
            assert!(!printed.contains("hunter2-admin"));
            assert!(printed.contains("<redacted>"));
        }
        assert!(format!("{:?}", config).contains("admin_username: \"admin\""));
    }
}
