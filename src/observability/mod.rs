//! Observability subsystem.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Every request runs inside a span carrying its request ID
//! - Credentials are never logged, only usernames

pub mod logging;
