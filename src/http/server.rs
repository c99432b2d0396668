//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the static file routes
//! - Wire up middleware (request ID, security headers, tracing, limits,
//!   timeout, authentication)
//! - Bind server to listener and shut down gracefully

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GateConfig;
use crate::http::request::{make_request_span, UuidRequestId};
use crate::lifecycle::ShutdownSignal;
use crate::security::headers::InvalidHeaderConfig;
use crate::security::limits::body_limit_layer;
use crate::security::{
    basic_auth_middleware, security_headers_middleware, AuthError, AuthGate, SecurityHeaders,
};

/// Errors raised while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to build credential table: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Headers(#[from] InvalidHeaderConfig),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Immutable state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub auth: Arc<AuthGate>,
    pub headers: Arc<SecurityHeaders>,
}

impl AppState {
    /// Build the credential table and header set from configuration.
    pub fn from_config(config: GateConfig) -> Result<Self, ServerError> {
        let auth = AuthGate::from_config(&config.auth)?;
        let headers = SecurityHeaders::from_config(&config.headers)?;

        Ok(Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            headers: Arc::new(headers),
        })
    }
}

/// HTTP server for the static front-end.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(config)?;

        let root = Path::new(&state.config.static_files.root);
        if !root.is_dir() {
            tracing::warn!(
                static_root = %root.display(),
                "Static directory does not exist; every file request will 404"
            );
        }

        let router = build_router(&state);
        Ok(Self { router, state })
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.state.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            auth_enabled = self.state.auth.enabled(),
            users = self.state.auth.store().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn index_path(state: &AppState) -> PathBuf {
    let files = &state.config.static_files;
    Path::new(&files.root).join(&files.index_file)
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: &AppState) -> Router {
    let routes = Router::new()
        .route_service("/", ServeFile::new(index_path(state)))
        .nest_service("/static", ServeDir::new(&state.config.static_files.root));

    apply_layers(routes, state)
}

/// Wrap `routes` in the request pipeline.
///
/// Layer order, outermost first: request ID, security headers, tracing, body
/// limit, timeout, authentication.
#[allow(deprecated)]
pub fn apply_layers(routes: Router, state: &AppState) -> Router {
    let config = &state.config;

    routes
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            basic_auth_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn_with_state(
                    state.headers.clone(),
                    security_headers_middleware,
                ))
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(body_limit_layer(&config.limits))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.timeouts.request_secs,
                ))),
        )
}
