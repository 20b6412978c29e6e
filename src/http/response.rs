//! Error responses.
//!
//! # Responsibilities
//! - Map gateway-level failures to HTTP status codes
//! - Render every error as a `{"detail": "..."}` JSON body
//!
//! # Design Decisions
//! - Upstream timeouts result in 504 Gateway Timeout
//! - Upstream connection failures result in 502 Bad Gateway
//! - Rate limiting is reported as 429 with no Retry-After
//! - Bodies over the size ceiling are 413; other body read failures are 400

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::LengthLimitError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Rate limit exceeded: maximum {threshold} requests per minute")]
    RateLimited { threshold: u32 },

    #[error("Model server timed out")]
    UpstreamTimeout,

    #[error("Model server unavailable")]
    UpstreamUnavailable,

    #[error("Invalid upstream path")]
    InvalidPath,

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Failed to read request body")]
    BodyRead,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            ApiError::InvalidPath => StatusCode::BAD_REQUEST,
            ApiError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BodyRead => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::UpstreamTimeout
        } else {
            ApiError::UpstreamUnavailable
        }
    }
}

impl From<axum::Error> for ApiError {
    fn from(e: axum::Error) -> Self {
        if is_length_limit(&e) {
            ApiError::BodyTooLarge
        } else {
            ApiError::BodyRead
        }
    }
}

fn is_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_message_is_stable() {
        let err = ApiError::RateLimited { threshold: 60 };
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded: maximum 60 requests per minute"
        );
    }

    #[tokio::test]
    async fn body_over_limit_maps_to_413() {
        let body = axum::body::Body::from(vec![0u8; 64]);
        let err = axum::body::to_bytes(body, 16).await.unwrap_err();

        let err = ApiError::from(err);
        assert!(matches!(err, ApiError::BodyTooLarge));
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn other_body_failures_map_to_400() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away");

        let err = ApiError::from(axum::Error::new(io));
        assert!(matches!(err, ApiError::BodyRead));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
