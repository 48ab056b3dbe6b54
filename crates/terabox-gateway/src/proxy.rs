//! Streaming download proxy with byte-range passthrough
//!
//! Relays an upstream resource to the client without buffering the body:
//! the inbound Range header is forwarded verbatim, the upstream status and
//! content headers are propagated, and the body is streamed chunk by chunk.

use crate::error::ApiError;
use crate::server::SharedState;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const REFERER: &str = "https://terabox.com/";

/// Query parameters for GET /proxy
#[derive(Deserialize)]
pub struct ProxyQuery {
    url: Option<String>,
    file_name: Option<String>,
}

/// GET /proxy - relay an upstream download to the client
pub async fn download(
    State(state): State<SharedState>,
    Query(params): Query<ProxyQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(raw_url) = params.url.filter(|u| !u.is_empty()) else {
        return ApiError::BadRequest("No URL provided for proxy".to_string()).into_response();
    };
    let file_name = params.file_name.unwrap_or_else(|| "download".to_string());

    let Ok(upstream_url) = Url::parse(&raw_url) else {
        return ApiError::BadRequest("Invalid URL".to_string()).into_response();
    };

    let mut request = state
        .proxy_client
        .get(upstream_url)
        .header(header::USER_AGENT, USER_AGENT)
        .header(header::ACCEPT, ACCEPT)
        .header(header::REFERER, REFERER);

    if let Some(cookie) = &state.cookie {
        request = request.header(header::COOKIE, cookie.as_str());
    }

    // Forwarded verbatim; range semantics are the upstream's to interpret.
    if let Some(range) = headers.get(header::RANGE).and_then(|v| v.to_str().ok()) {
        debug!(range, "forwarding range request");
        request = request.header(header::RANGE, range);
    }

    // A reachable upstream's status is relayed verbatim below, including
    // 4xx/5xx; only transport failure becomes a gateway error.
    let upstream = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(url = %raw_url, error = %e, "Upstream fetch failed");
            return ApiError::BadGateway("Failed to fetch download".to_string()).into_response();
        }
    };

    relay(upstream, &file_name)
}

/// Compose the client response: status passthrough, content headers, and an
/// incrementally streamed body.
fn relay(upstream: reqwest::Response, file_name: &str) -> Response {
    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);

    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", file_name),
        )
        // Advertised unconditionally even when the upstream never confirmed
        // range support; such an upstream answers 200 with the full body.
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, "public, max-age=3600");

    if let Some(content_range) = upstream
        .headers()
        .get(reqwest::header::CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
    {
        builder = builder.header(header::CONTENT_RANGE, content_range.to_string());
    }
    if let Some(content_length) = upstream
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
    {
        builder = builder.header(header::CONTENT_LENGTH, content_length.to_string());
    }

    // The body is never collected: dropping the response when the client
    // disconnects drops the stream and releases the upstream connection.
    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
