//! Per-IP sliding-window rate limiting.
//!
//! Each client key owns an ordered log of admission instants. Before every
//! check the log is pruned of entries at least one window old; the request is
//! admitted only while fewer than `threshold` entries remain. Rejected requests
//! are not recorded.
//!
//! The log map is a `DashMap`, and the prune/check/append sequence runs while
//! holding the shard guard for the key, so concurrent requests from one client
//! cannot be admitted past the threshold.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::security::clock::{Clock, SystemClock};

/// Trailing window over which requests are counted.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Key used for requests without a resolvable remote address.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Limiter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per key per window.
    pub threshold: u32,
    pub window: Duration,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Reject,
}

impl Decision {
    pub fn is_admit(self) -> bool {
        matches!(self, Decision::Admit)
    }
}

/// In-memory sliding-window limiter keyed by client identity.
pub struct RateLimiter {
    logs: DashMap<String, VecDeque<Instant>>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            logs: DashMap::new(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Check `client_key` against the limiter's clock.
    pub fn check(&self, client_key: &str) -> Decision {
        self.check_and_record(client_key, self.clock.now())
    }

    /// Admit or reject a request from `client_key` arriving at `now`.
    ///
    /// Admitted requests are appended to the key's log; rejected ones are not.
    pub fn check_and_record(&self, client_key: &str, now: Instant) -> Decision {
        let window = self.config.window;
        let mut log = self.logs.entry(client_key.to_owned()).or_default();

        prune(&mut log, now, window);

        if log.len() >= self.config.threshold as usize {
            return Decision::Reject;
        }

        log.push_back(now);
        Decision::Admit
    }

    /// Prune every log and drop keys left empty. Returns the number of keys removed.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let window = self.config.window;
        let before = self.logs.len();

        self.logs.retain(|_, log| {
            prune(log, now, window);
            !log.is_empty()
        });

        before.saturating_sub(self.logs.len())
    }

    /// Number of client keys currently holding a log.
    pub fn tracked_clients(&self) -> usize {
        self.logs.len()
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }
}

// Entries newer than `now` (clock jitter) count as zero elapsed and are kept.
fn prune(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    log.retain(|&at| now.saturating_duration_since(at) < window);
}

/// Derive the client key from the connection's remote address.
pub fn client_key<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware function for per-IP rate limiting.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&request);

    match limiter.check(&key) {
        Decision::Admit => next.run(request).await,
        Decision::Reject => {
            let threshold = limiter.config().threshold;
            tracing::warn!(client = %key, threshold, "Rate limit exceeded");
            metrics::record_rate_limited();
            ApiError::RateLimited { threshold }.into_response()
        }
    }
}
