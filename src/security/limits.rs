//! Request size limits.
//!
//! Bodies larger than `max_request_body_size` are rejected with
//! 413 Payload Too Large before any handler buffers them.

use tower_http::limit::RequestBodyLimitLayer;

use crate::config::Settings;

pub fn body_limit_layer(settings: &Settings) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(settings.max_request_body_size)
}
