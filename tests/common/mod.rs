//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::Request,
    http::StatusCode,
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use nanocode_gateway::security::MockClock;
use nanocode_gateway::{HttpServer, Settings, Shutdown};
use tokio::net::TcpListener;

/// Settings with the given rate limit and upstream URL.
#[allow(dead_code)]
pub fn settings(rate_limit: u32, model_server: &str) -> Settings {
    Settings {
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        model_server_url: model_server.parse().unwrap(),
        rate_limit_per_minute: rate_limit,
        ..Settings::default()
    }
}

/// Build an in-process gateway router driven by a mock clock.
#[allow(dead_code)]
pub fn gateway_with_clock(settings: Settings) -> (Router, MockClock) {
    let clock = MockClock::new(Instant::now());
    let server = HttpServer::with_clock(settings, Arc::new(clock.clone()));
    (server.router(), clock)
}

/// Start a gateway on an ephemeral port. The returned handle stops it on trigger.
#[allow(dead_code)]
pub async fn start_gateway(settings: Settings) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = HttpServer::new(settings).run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Start a mock model server on an ephemeral port.
///
/// - `ANY /echo/{*rest}` returns the method, path, query and body it received
/// - `GET /slow` answers after two seconds
/// - `GET /` answers 200
#[allow(dead_code)]
pub async fn start_mock_model_server() -> SocketAddr {
    let app = Router::new()
        .route("/", get(|| async { "model server" }))
        .route("/echo/{*rest}", any(echo))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

#[allow(dead_code)]
async fn echo(request: Request) -> impl IntoResponse {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let content_type = request
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body: Bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap_or_default();

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "method": method,
            "path": path,
            "query": query,
            "content_type": content_type,
            "body": String::from_utf8_lossy(&body),
        })),
    )
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
