//! Nanocode feature router.
//!
//! Every request under `/nanocode/` is relayed to the configured model server
//! with the same method, query, body and content type, bounded by
//! `model_timeout_seconds`.

pub mod forward;

use axum::{routing::any, Router};

use crate::http::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/nanocode/{*path}", any(forward::forward))
}
