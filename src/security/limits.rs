//! Request limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size
//!
//! # Design Decisions
//! - Requests whose `Content-Length` exceeds the ceiling get 413 Payload Too
//!   Large before authentication or file lookup runs
//! - Streaming bodies without a length are capped at the same ceiling

use tower_http::limit::RequestBodyLimitLayer;

use crate::config::schema::LimitsConfig;

/// Layer enforcing `limits.max_body_bytes`.
pub fn body_limit_layer(config: &LimitsConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(config.max_body_bytes)
}
