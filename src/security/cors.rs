//! Cross-origin resource sharing policy.
//!
//! Exact-match allow-list of local development origins. Credentials are
//! allowed, so "any method / any header" is expressed by mirroring the
//! preflight request rather than with a `*` wildcard.
//!
//! Preflights from unlisted origins are refused with 400 before they reach the
//! limiter or a router. Simple requests from unlisted origins pass through
//! without CORS headers.

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Origins permitted to make credentialed cross-origin requests.
pub const ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:4173",
    "http://127.0.0.1:4173",
];

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            ALLOWED_ORIGINS.into_iter().map(HeaderValue::from_static),
        ))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Answer preflights from origins outside the allow-list with 400.
pub async fn reject_disallowed_preflight(request: Request, next: Next) -> Response {
    if is_disallowed_preflight(&request) {
        tracing::debug!(
            origin = ?request.headers().get(header::ORIGIN),
            path = %request.uri().path(),
            "Rejected CORS preflight"
        );
        return (StatusCode::BAD_REQUEST, "Disallowed CORS origin").into_response();
    }
    next.run(request).await
}

fn is_disallowed_preflight<B>(request: &Request<B>) -> bool {
    if request.method() != Method::OPTIONS
        || !request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
    {
        return false;
    }
    match request.headers().get(header::ORIGIN) {
        Some(origin) => !is_allowed_origin(origin),
        None => false,
    }
}

fn is_allowed_origin(origin: &HeaderValue) -> bool {
    ALLOWED_ORIGINS
        .iter()
        .any(|allowed| origin.as_bytes() == allowed.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn options(origin: Option<&str>, with_request_method: bool) -> Request<Body> {
        let mut builder = Request::builder().method(Method::OPTIONS).uri("/health");
        if let Some(origin) = origin {
            builder = builder.header(header::ORIGIN, origin);
        }
        if with_request_method {
            builder = builder.header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET");
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn only_preflights_from_unlisted_origins_are_refused() {
        assert!(is_disallowed_preflight(&options(Some("http://evil.test"), true)));
        assert!(is_disallowed_preflight(&options(Some("http://localhost:3000"), true)));

        assert!(!is_disallowed_preflight(&options(Some("http://localhost:5173"), true)));
        assert!(!is_disallowed_preflight(&options(Some("http://evil.test"), false)));
        assert!(!is_disallowed_preflight(&options(None, true)));

        let get = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://evil.test")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        assert!(!is_disallowed_preflight(&get));
    }
}
