//! Security subsystem (the request gate).
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (reject oversized bodies with 413)
//!     → auth.rs (Basic credentials, 401 + challenge on failure)
//!     → static file services
//! Outgoing response:
//!     → headers.rs (stamp the fixed security header set)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any credential problem
//! - Everything here is built once at startup and read-only afterwards

pub mod auth;
pub mod headers;
pub mod limits;
pub mod password;

pub use auth::{basic_auth_middleware, AuthError, AuthGate, BasicCredentials, CredentialStore};
pub use headers::{security_headers_middleware, SecurityHeaders};
