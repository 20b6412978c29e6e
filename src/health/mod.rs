//! Health router.
//!
//! # Endpoints
//! ```text
//! GET /health        liveness, always 200 while the process serves
//! GET /health/ready  readiness, 503 when the model server cannot be reached
//! ```

pub mod active;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;
use self::active::probe_model_server;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub model_server: String,
    pub model_server_reachable: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/ready", get(readiness))
}

async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let url = &state.settings.model_server_url;
    let outcome = probe_model_server(&state.client, url, state.settings.model_timeout()).await;
    let reachable = outcome.is_reachable();

    let (status, label) = if reachable {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        status,
        Json(Readiness {
            status: label,
            model_server: url.to_string(),
            model_server_reachable: reachable,
        }),
    )
}
