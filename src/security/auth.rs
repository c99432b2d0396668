//! HTTP Basic authentication.
//!
//! # Responsibilities
//! - Hold the immutable credential table (username → Argon2 hash)
//! - Parse `Authorization: Basic ...` headers
//! - Reject unauthenticated requests with 401 and a `WWW-Authenticate` challenge
//!
//! # Design Decisions
//! - Built once at startup from `AuthConfig` and shared read-only via `Arc`
//! - Password verification runs on the blocking pool (Argon2 is CPU bound),
//!   at most `auth.max_concurrent_verifications` at a time
//! - Unknown usernames are verified against a dummy hash to keep timing flat

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tokio::sync::Semaphore;

use crate::config::schema::{generate_secret_key, AuthConfig};
use crate::security::password::{hash_password, verify_password, PasswordError};

/// Body of every 401 response.
pub const UNAUTHORIZED_BODY: &str =
    "Could not verify your access level for that URL.\nYou have to login with proper credentials";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Realm `{0}` cannot be used in a WWW-Authenticate header")]
    InvalidRealm(String),

    #[error("At least one concurrent password verification must be allowed")]
    ZeroVerificationLimit,

    #[error("Credential check aborted: {0}")]
    Aborted(String),
}

/// Credentials decoded from a Basic `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Decode `Basic base64(username:password)`.
    ///
    /// The scheme is matched case-insensitively and the payload is split at the
    /// first colon, so passwords may contain `:`.
    pub fn from_header(value: &HeaderValue) -> Option<Self> {
        let value = value.to_str().ok()?;
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = BASE64.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Immutable username → password hash table.
#[derive(Debug)]
pub struct CredentialStore {
    users: HashMap<String, String>,
    dummy_hash: String,
}

impl CredentialStore {
    /// Build the table from pre-computed PHC hashes.
    pub fn new(users: HashMap<String, String>) -> Result<Self, AuthError> {
        Ok(Self {
            users,
            dummy_hash: hash_password(&generate_secret_key())?,
        })
    }

    /// Hash the built-in user's password and add the configured users.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let mut users = HashMap::with_capacity(config.users.len() + 1);
        users.insert(
            config.admin_username.clone(),
            hash_password(&config.admin_password)?,
        );
        for user in &config.users {
            // Fail at startup rather than on the first login attempt.
            argon2::password_hash::PasswordHash::new(&user.password_hash)
                .map_err(|e| PasswordError::InvalidHash(e.to_string()))?;
            users.insert(user.username.clone(), user.password_hash.clone());
        }
        Self::new(users)
    }

    /// Check a username/password pair against the table.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(hash) => verify_password(password, hash).unwrap_or(false),
            None => {
                let _ = verify_password(password, &self.dummy_hash);
                false
            }
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// The authentication stage of the request pipeline.
#[derive(Debug)]
pub struct AuthGate {
    enabled: bool,
    challenge: HeaderValue,
    store: Arc<CredentialStore>,
    /// Permits for Argon2 verifications; each one holds ~19 MiB while running.
    verifications: Arc<Semaphore>,
    max_verifications: usize,
    peak_verifications: Arc<AtomicUsize>,
}

impl AuthGate {
    pub fn new(
        enabled: bool,
        realm: &str,
        max_concurrent_verifications: usize,
        store: CredentialStore,
    ) -> Result<Self, AuthError> {
        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm))
            .map_err(|_| AuthError::InvalidRealm(realm.to_string()))?;
        if max_concurrent_verifications == 0 {
            return Err(AuthError::ZeroVerificationLimit);
        }
        Ok(Self {
            enabled,
            challenge,
            store: Arc::new(store),
            verifications: Arc::new(Semaphore::new(max_concurrent_verifications)),
            max_verifications: max_concurrent_verifications,
            peak_verifications: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::new(
            config.enabled,
            &config.realm,
            config.max_concurrent_verifications,
            CredentialStore::from_config(config)?,
        )
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Check decoded credentials on the calling thread.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.store.authenticate(username, password)
    }

    /// Check credentials on the blocking pool, waiting for a free
    /// verification permit first. The permit is held until Argon2 finishes,
    /// even if the caller stops waiting.
    pub async fn verify(&self, credentials: BasicCredentials) -> Result<bool, AuthError> {
        let permit = self
            .verifications
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AuthError::Aborted(e.to_string()))?;

        let store = self.store.clone();
        let verifications = self.verifications.clone();
        let max = self.max_verifications;
        let peak = self.peak_verifications.clone();

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            peak.fetch_max(max - verifications.available_permits(), Ordering::Relaxed);
            store.authenticate(&credentials.username, &credentials.password)
        })
        .await
        .map_err(|e| AuthError::Aborted(e.to_string()))
    }

    /// Configured verification limit.
    pub fn max_verifications(&self) -> usize {
        self.max_verifications
    }

    /// Highest number of verifications observed running at once.
    pub fn peak_verifications(&self) -> usize {
        self.peak_verifications.load(Ordering::Relaxed)
    }

    /// 401 response with the Basic challenge.
    pub fn challenge(&self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, self.challenge.clone())],
            UNAUTHORIZED_BODY,
        )
            .into_response()
    }
}

/// Middleware that short-circuits with 401 unless valid Basic credentials
/// are present. Passes everything through when auth is disabled.
pub async fn basic_auth_middleware(
    State(gate): State<Arc<AuthGate>>,
    request: Request,
    next: Next,
) -> Response {
    if !gate.enabled() {
        return next.run(request).await;
    }

    let credentials = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(BasicCredentials::from_header);

    let Some(credentials) = credentials else {
        tracing::debug!(path = %request.uri().path(), "Missing or malformed credentials");
        return gate.challenge();
    };

    let username = credentials.username.clone();

    match gate.verify(credentials).await {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            tracing::warn!(
                username = %username,
                path = %request.uri().path(),
                "Rejected credentials"
            );
            gate.challenge()
        }
        Err(e) => {
            tracing::error!(error = %e, "Credential check failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UserEntry;

    fn header(raw: &str) -> HeaderValue {
        HeaderValue::from_str(raw).unwrap()
    }

    fn basic(userpass: &str) -> HeaderValue {
        header(&format!("Basic {}", BASE64.encode(userpass)))
    }

    #[test]
    fn test_parse_basic_credentials() {
        let creds = BasicCredentials::from_header(&basic("admin:secret")).unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_parse_scheme_is_case_insensitive() {
        let encoded = BASE64.encode("admin:secret");
        for scheme in ["basic", "BASIC", "bAsIc"] {
            let value = header(&format!("{} {}", scheme, encoded));
            assert!(BasicCredentials::from_header(&value).is_some(), "{scheme}");
        }
    }

    #[test]
    fn test_password_may_contain_colons() {
        let creds = BasicCredentials::from_header(&basic("admin:a:b:c")).unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "a:b:c");
    }

    #[test]
    fn test_parse_rejects_malformed_headers() {
        assert!(BasicCredentials::from_header(&header("Bearer abc")).is_none());
        assert!(BasicCredentials::from_header(&header("Basic")).is_none());
        assert!(BasicCredentials::from_header(&header("Basic !!!not-base64")).is_none());
        assert!(BasicCredentials::from_header(&basic("no-colon")).is_none());

        let invalid_utf8 = BASE64.encode([0xff, 0xfe, b':', b'x']);
        assert!(BasicCredentials::from_header(&header(&format!("Basic {invalid_utf8}"))).is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = BasicCredentials::from_header(&basic("admin:hunter2")).unwrap();
        let printed = format!("{:?}", creds);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_authenticate_builtin_user() {
        let config = AuthConfig {
            admin_password: "correct horse".into(),
            ..AuthConfig::default()
        };
        let store = CredentialStore::from_config(&config).unwrap();

        assert!(store.authenticate("admin", "correct horse"));
        assert!(!store.authenticate("admin", "battery staple"));
        assert!(!store.authenticate("root", "correct horse"));
        assert!(!store.authenticate("", ""));
    }

    #[test]
    fn test_authenticate_configured_users() {
        let config = AuthConfig {
            users: vec![UserEntry {
                username: "viewer".into(),
                password_hash: hash_password("viewer-pass").unwrap(),
            }],
            ..AuthConfig::default()
        };
        let store = CredentialStore::from_config(&config).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.contains("viewer"));
        assert!(store.authenticate("viewer", "viewer-pass"));
        assert!(!store.authenticate("viewer", "change_me_in_production"));
    }

    #[test]
    fn test_invalid_stored_hash_fails_construction() {
        let config = AuthConfig {
            users: vec![UserEntry {
                username: "viewer".into(),
                password_hash: "plaintext".into(),
            }],
            ..AuthConfig::default()
        };
        let err = CredentialStore::from_config(&config).unwrap_err();
        assert!(matches!(err, AuthError::Password(PasswordError::InvalidHash(_))));
    }

    #[test]
    fn test_challenge_response() {
        let store = CredentialStore::new(HashMap::new()).unwrap();
        let gate = AuthGate::new(true, "Login Required", 4, store).unwrap();
        let response = gate.challenge();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"Login Required\""
        );
    }

    #[test]
    fn test_realm_must_be_header_safe() {
        let store = CredentialStore::new(HashMap::new()).unwrap();
        let err = AuthGate::new(true, "bad\nrealm", 4, store).unwrap_err();
        assert!(matches!(err, AuthError::InvalidRealm(_)));
    }

    #[test]
    fn test_zero_verification_limit_rejected() {
        let store = CredentialStore::new(HashMap::new()).unwrap();
        let err = AuthGate::new(true, "Login Required", 0, store).unwrap_err();
        assert!(matches!(err, AuthError::ZeroVerificationLimit));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_verifications_never_exceed_limit() {
        let config = AuthConfig {
            admin_password: "correct horse".into(),
            max_concurrent_verifications: 2,
            ..AuthConfig::default()
        };
        let gate = Arc::new(AuthGate::from_config(&config).unwrap());

        let tasks: Vec<_> = (0..24)
            .map(|i| {
                let gate = gate.clone();
                tokio::spawn(async move {
                    let credentials = BasicCredentials {
                        username: format!("user{i}"),
                        password: "wrong".into(),
                    };
                    gate.verify(credentials).await.unwrap()
                })
            })
            .collect();
        for task in tasks {
            assert!(!task.await.unwrap());
        }

        assert!(gate.peak_verifications() >= 1);
        assert!(gate.peak_verifications() <= 2, "peak {}", gate.peak_verifications());
        assert_eq!(gate.max_verifications(), 2);
    }
}
