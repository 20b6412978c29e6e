//! Forwarding of nanocode requests to the model server.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Request},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Headers copied from the client request to the upstream request.
const FORWARDED_REQUEST_HEADERS: [header::HeaderName; 2] = [header::CONTENT_TYPE, header::ACCEPT];

/// Build the upstream URL for `path` (relative to the nanocode prefix).
pub fn upstream_url(base: &Url, path: &str, query: Option<&str>) -> Result<Url, ApiError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(ApiError::InvalidPath);
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidPath)?
        .pop_if_empty()
        .extend(segments);
    url.set_query(query);
    Ok(url)
}

pub async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: Request<Body>,
) -> Result<Response, ApiError> {
    let url = upstream_url(&state.settings.model_server_url, &path, request.uri().query())?;
    let (parts, body) = request.into_parts();

    let body = axum::body::to_bytes(body, state.settings.max_request_body_size).await?;

    let mut upstream = state
        .client
        .request(parts.method.clone(), url.clone())
        .timeout(state.settings.model_timeout())
        .body(body);
    for name in FORWARDED_REQUEST_HEADERS {
        if let Some(value) = parts.headers.get(&name) {
            upstream = upstream.header(name, value.clone());
        }
    }

    tracing::debug!(method = %parts.method, upstream = %url, "Forwarding to model server");

    let response = match upstream.send().await {
        Ok(response) => response,
        Err(e) => {
            let err = ApiError::from(e);
            let outcome = match err {
                ApiError::UpstreamTimeout => "timeout",
                _ => "error",
            };
            tracing::warn!(upstream = %url, error = %err, "Model server request failed");
            metrics::record_upstream(outcome);
            return Err(err);
        }
    };

    let status = response.status();
    let mut headers = HeaderMap::new();
    if let Some(content_type) = response.headers().get(header::CONTENT_TYPE) {
        headers.insert(header::CONTENT_TYPE, content_type.clone());
    }
    let bytes = response.bytes().await?;

    metrics::record_upstream("ok");
    Ok((status, headers, bytes).into_response())
}
