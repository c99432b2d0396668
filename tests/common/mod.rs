//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use static_gate::config::GateConfig;
use static_gate::http::HttpServer;
use static_gate::lifecycle::Shutdown;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test-password";

pub const DEFAULT_CSP: &str = "default-src 'self'; script-src 'self'; \
    style-src 'self' 'unsafe-inline'; img-src 'self' data: blob:; \
    media-src 'self' blob:; connect-src 'self'";

/// Directory holding the fixture front-end.
pub fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/static")
}

/// Bytes of a fixture file, relative to the fixture root.
pub fn fixture_bytes(relative: &str) -> Vec<u8> {
    std::fs::read(fixture_root().join(relative)).unwrap()
}

/// Default config pointed at the fixtures, with a known admin password.
pub fn test_config(auth_enabled: bool) -> GateConfig {
    let mut config = GateConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.static_files.root = fixture_root().to_string_lossy().into_owned();
    config.auth.enabled = auth_enabled;
    config.auth.admin_password = TEST_PASSWORD.into();
    config
}

pub fn router(config: GateConfig) -> Router {
    HttpServer::new(config).unwrap().router()
}

/// `Authorization` header value for the given pair.
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{}:{}", username, password)))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_as(uri: &str, username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", basic_auth(username, password))
        .body(Body::empty())
        .unwrap()
}

/// Drive one request through the router.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

/// Assert the default security header set is present with exact values.
pub fn assert_security_headers(headers: &HeaderMap) {
    let expected = [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "SAMEORIGIN"),
        ("x-xss-protection", "1; mode=block"),
        ("permissions-policy", "geolocation=(), camera=(), microphone=()"),
        ("content-security-policy", DEFAULT_CSP),
        ("cache-control", "no-cache, no-store, must-revalidate"),
        ("pragma", "no-cache"),
        ("expires", "0"),
    ];
    for (name, value) in expected {
        assert_eq!(
            headers.get(name).and_then(|v| v.to_str().ok()),
            Some(value),
            "header {name}"
        );
    }
}

/// Start a real server on an ephemeral port.
pub async fn spawn_server(config: GateConfig) -> (SocketAddr, Shutdown, JoinHandle<()>) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });

    (addr, shutdown, handle)
}
