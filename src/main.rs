//! Nanocode API gateway.
//!
//! A small gateway built with Tokio and Axum that fronts the nanocode
//! feature router, the health checks and the admin views.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                   GATEWAY                    │
//!   Client Request    │  ┌──────┐   ┌─────────┐   ┌───────────────┐  │
//!   ──────────────────┼─▶│ CORS │──▶│security │──▶│ rate limiter  │  │
//!                     │  └──────┘   │ headers │   │ (per-IP, 60s) │  │
//!                     │             └─────────┘   └───────┬───────┘  │
//!                     │                                   ▼          │
//!                     │        ┌────────┬─────────┬────────────┐     │
//!                     │        │ health │  admin  │  nanocode  │─────┼──▶ Model
//!                     │        └────────┴─────────┴────────────┘     │    Server
//!                     └──────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;

use nanocode_gateway::config;
use nanocode_gateway::lifecycle::{signals::shutdown_on_signal, Shutdown};
use nanocode_gateway::observability::{logging, metrics};
use nanocode_gateway::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Fail fast on malformed settings, before anything binds.
    let settings = config::settings()?.clone();

    logging::init_logging(settings.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "nanocode-gateway starting");

    tracing::info!(
        api_host = %settings.api_host,
        api_port = settings.api_port,
        model_server_url = %settings.model_server_url,
        log_level = %settings.log_level,
        max_request_body_size = settings.max_request_body_size,
        model_timeout_seconds = settings.model_timeout_seconds,
        rate_limit_per_minute = settings.rate_limit_per_minute,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(settings.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let mut server = HttpServer::new(settings);
    if let Some(handle) = metrics::install_recorder() {
        server = server.with_metrics(handle);
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown_on_signal(shutdown));

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
