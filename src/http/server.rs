//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health, admin and nanocode routers
//! - Wire up middleware (tracing, request ID, CORS, security headers,
//!   rate limiting, metrics, body limit)
//! - Serve on a listener with graceful shutdown
//! - Run the rate limiter eviction sweeper

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::Settings;
use crate::http::request::with_request_tracing;
use crate::lifecycle::shutdown::wait;
use crate::observability::metrics::track_metrics;
use crate::security::{
    clock::{Clock, SystemClock},
    cors::{cors_layer, reject_disallowed_preflight},
    headers::with_security_headers,
    limits::body_limit_layer,
    rate_limit::{rate_limit_middleware, RateLimiter},
};
use crate::{admin, health, nanocode};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub limiter: Arc<RateLimiter>,
    pub client: reqwest::Client,
    pub metrics: Option<PrometheusHandle>,
    pub started_at: Instant,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Create a server using the system clock and no metrics recorder.
    pub fn new(settings: Settings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Create a server whose rate limiter reads `clock`.
    pub fn with_clock(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let limiter = Arc::new(RateLimiter::with_clock(settings.rate_limit(), clock));

        let state = AppState {
            settings: Arc::new(settings),
            limiter,
            client: reqwest::Client::new(),
            metrics: None,
            started_at: Instant::now(),
        };

        Self { state }
    }

    /// Expose rendered metrics on `/admin/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.state.metrics = Some(handle);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers added later wrap earlier ones, so a request passes through
    /// tracing, security headers, the preflight origin check, CORS, the rate
    /// limiter, metrics and the body limit before reaching a router.
    pub fn router(&self) -> Router {
        let state = self.state.clone();

        let routes = Router::new()
            .merge(health::router())
            .merge(admin::router())
            .merge(nanocode::router())
            .layer(body_limit_layer(&state.settings))
            .layer(middleware::from_fn(track_metrics))
            .layer(middleware::from_fn_with_state(
                state.limiter.clone(),
                rate_limit_middleware,
            ))
            .with_state(state);

        let routes = routes
            .layer(cors_layer())
            .layer(middleware::from_fn(reject_disallowed_preflight));

        with_request_tracing(with_security_headers(routes))
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let config = self.state.limiter.config();
        tracing::info!(
            address = %addr,
            rate_limit = config.threshold,
            window_secs = config.window.as_secs(),
            model_server = %self.state.settings.model_server_url,
            "HTTP server starting"
        );

        let sweeper = tokio::spawn(run_eviction_sweeper(
            self.state.limiter.clone(),
            shutdown.resubscribe(),
        ));

        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait(shutdown))
            .await?;

        sweeper.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Periodically drop limiter keys whose logs have emptied.
async fn run_eviction_sweeper(limiter: Arc<RateLimiter>, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(limiter.config().window);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let evicted = limiter.evict_idle(limiter.now());
                if evicted > 0 {
                    tracing::debug!(
                        evicted,
                        tracked = limiter.tracked_clients(),
                        "Evicted idle rate limit keys"
                    );
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!("Eviction sweeper received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
