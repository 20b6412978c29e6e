//! Admin router: read-only operational views of the gateway.

pub mod handlers;

use axum::{routing::get, Router};

use crate::http::server::AppState;
use self::handlers::*;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/config", get(get_config))
        .route("/admin/rate-limits", get(get_rate_limits))
        .route("/admin/metrics", get(get_metrics))
}
