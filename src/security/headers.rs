//! Security response headers.
//!
//! # Responsibilities
//! - Build the fixed header set once from `HeadersConfig`
//! - Stamp it onto every response, whatever the status
//!
//! # Design Decisions
//! - Ordered list of (name, value) pairs shared read-only via `Arc`
//! - Values are overwritten, never appended, so inner stages cannot weaken them
//! - Body and status are never touched

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_SECURITY_POLICY, EXPIRES, PRAGMA,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
        },
        HeaderMap, HeaderName, HeaderValue,
    },
    middleware::Next,
    response::Response,
};

use crate::config::schema::HeadersConfig;

/// `Permissions-Policy` is not in the `http` crate's constant list.
pub const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

#[derive(Debug, thiserror::Error)]
#[error("headers.{field} is not a valid header value")]
pub struct InvalidHeaderConfig {
    pub field: &'static str,
}

/// The fixed set of headers added to every response.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    /// Build the header set from configuration.
    pub fn from_config(config: &HeadersConfig) -> Result<Self, InvalidHeaderConfig> {
        let mut headers = Vec::with_capacity(11);

        headers.push((X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")));
        headers.push((
            X_FRAME_OPTIONS,
            configured("frame_options", &config.frame_options)?,
        ));
        // Legacy, still honoured by older browsers
        headers.push((X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")));
        headers.push((
            PERMISSIONS_POLICY,
            configured("permissions_policy", &config.permissions_policy)?,
        ));
        headers.push((
            CONTENT_SECURITY_POLICY,
            configured("content_security_policy", &config.content_security_policy)?,
        ));

        if config.no_cache {
            headers.push((
                CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-store, must-revalidate"),
            ));
            headers.push((PRAGMA, HeaderValue::from_static("no-cache")));
            headers.push((EXPIRES, HeaderValue::from_static("0")));
        }

        if config.permissive_cors {
            headers.push((ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")));
            headers.push((
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST, OPTIONS"),
            ));
            headers.push((
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type, Authorization"),
            ));
        }

        Ok(Self { headers })
    }

    /// Set every header on `target`, replacing existing values.
    pub fn decorate(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(name, value)| (name, value))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

fn configured(field: &'static str, value: &str) -> Result<HeaderValue, InvalidHeaderConfig> {
    HeaderValue::from_str(value).map_err(|_| InvalidHeaderConfig { field })
}

/// Middleware to add security headers to all responses.
///
/// Add it as one of the outermost layers so 401, 404 and 413 responses
/// produced by inner layers are covered too.
pub async fn security_headers_middleware(
    State(headers): State<Arc<SecurityHeaders>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    headers.decorate(response.headers_mut());
    response
}
