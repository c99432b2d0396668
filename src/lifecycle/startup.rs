//! Startup orchestration.
//!
//! # Responsibilities
//! - Report risky configuration
//! - Build request state (credential table, header set)
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last (traffic only when ready)

use tokio::net::TcpListener;

use crate::config::GateConfig;
use crate::http::server::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};

/// Run the gate with a loaded configuration until SIGINT/SIGTERM.
pub async fn run(config: GateConfig) -> Result<(), ServerError> {
    log_configuration(&config);

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, receiver).await
}

fn log_configuration(config: &GateConfig) {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        static_root = %config.static_files.root,
        auth_enabled = config.auth.enabled,
        extra_users = config.auth.users.len(),
        max_concurrent_verifications = config.auth.max_concurrent_verifications,
        no_cache = config.headers.no_cache,
        permissive_cors = config.headers.permissive_cors,
        max_body_bytes = config.limits.max_body_bytes,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.auth.enabled && config.auth.uses_default_password() {
        tracing::warn!(
            username = %config.auth.admin_username,
            "ADMIN_PASSWORD is not set; the built-in user has the placeholder password"
        );
    }
    if config.headers.permissive_cors {
        tracing::warn!("Wildcard CORS headers are enabled");
    }
}
