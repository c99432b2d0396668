//! static-gate
//!
//! Serves a static front-end from `static/`, optionally behind HTTP Basic
//! authentication, with a fixed set of security headers on every response.
//!
//! # Request Pipeline
//!
//! ```text
//!   Client ──▶ request id ──▶ security headers ──▶ trace ──▶ body limit (413)
//!                                                               │
//!                                                               ▼
//!   Client ◀── headers stamped ◀──── ServeFile / ServeDir ◀── basic auth (401)
//! ```
//!
//! # Environment
//! - `SECRET_KEY`: signing key (random when unset)
//! - `ADMIN_PASSWORD`: password of the built-in `admin` user
//! - `STATIC_GATE_CONFIG`: optional TOML config file
//! - `RUST_LOG`: log filter override

use static_gate::config;
use static_gate::lifecycle::startup;
use static_gate::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load and validate configuration first (fail-fast)
    let config = config::load_from_env()?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "static-gate starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
