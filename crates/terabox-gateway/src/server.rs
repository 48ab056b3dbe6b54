//! HTTP server: routing and the resolution endpoints
//!
//! Provides GET /api and POST / (cached share-link resolution), GET /proxy
//! (streaming relay, see `proxy`), plus the service and health surface.

use crate::config::Config;
use crate::error::ApiError;
use crate::proxy;
use crate::types::{FileInfoResponse, HealthResponse, LinkRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use expiring_cache::ExpiringCache;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use terabox_resolver::{ResolvedFile, ShareResolver};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Response header reporting whether the resolution came from the cache.
const X_CACHE_STATUS: &str = "x-cache-status";

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: ExpiringCache<ResolvedFile>,
    pub resolver: ShareResolver,
    /// Client for proxy upstream fetches. No overall timeout: transfers are
    /// arbitrarily large and bounded by the client connection instead.
    pub proxy_client: reqwest::Client,
    pub cookie: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(config: &Config) -> Self {
        Self {
            cache: ExpiringCache::new(config.cache_ttl),
            resolver: ShareResolver::new(config.cookie.clone()),
            proxy_client: reqwest::Client::new(),
            cookie: config.cookie.clone(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_RANGE])
        .max_age(Duration::from_secs(12 * 60 * 60));

    Router::new()
        .route("/", get(index).post(post_file_info))
        .route("/api", get(get_file_info))
        .route("/proxy", get(proxy::download))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Query parameters for GET /api
#[derive(Deserialize)]
pub struct FileInfoQuery {
    url: Option<String>,
}

/// GET /api - resolve a share link given as a query parameter
async fn get_file_info(
    State(state): State<SharedState>,
    Query(params): Query<FileInfoQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(link) = params.url.filter(|u| !u.is_empty()) else {
        return ApiError::BadRequest("No URL provided. Use ?url=your_terabox_link".to_string())
            .into_response();
    };

    resolve_file_info(&state, &headers, &link).await
}

/// POST / - resolve a share link given in a JSON body
async fn post_file_info(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<LinkRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = body else {
        return ApiError::BadRequest("No link provided in the request body".to_string())
            .into_response();
    };
    if request.link.is_empty() {
        return ApiError::BadRequest("No link provided in the request body".to_string())
            .into_response();
    }

    resolve_file_info(&state, &headers, &request.link).await
}

/// Cache-or-resolve path shared by both request shapes.
///
/// Concurrent misses for the same link may each invoke the resolver; the
/// later insert wins. Failed resolutions are never cached, so an identical
/// retry resolves from scratch.
async fn resolve_file_info(state: &ServerState, headers: &HeaderMap, link: &str) -> Response {
    let key = format!("file:{}", link);
    let (scheme, host) = request_origin(headers);

    if let Some(record) = state.cache.get(&key).await {
        let body = FileInfoResponse::compose(&record, scheme, &host);
        return ([(X_CACHE_STATUS, "HIT")], Json(body)).into_response();
    }

    match state.resolver.resolve(link).await {
        Ok(record) => {
            state.cache.insert(key, record.clone()).await;
            let body = FileInfoResponse::compose(&record, scheme, &host);
            ([(X_CACHE_STATUS, "MISS")], Json(body)).into_response()
        }
        Err(e) => {
            warn!(link, error = %e, "Resolution failed");
            ApiError::from(e).into_response()
        }
    }
}

/// Scheme and host as seen by the client, for composing the proxy URL.
/// The scheme trusts the X-Forwarded-Proto header set by the TLS terminator.
fn request_origin(headers: &HeaderMap) -> (&'static str, String) {
    let scheme = match headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
    {
        Some("https") => "https",
        _ => "http",
    };

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost")
        .to_string();

    (scheme, host)
}

/// GET / - service description
async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "name": "TeraBox Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "online",
        "endpoints": {
            "POST /": "Get file info (JSON body with 'link' field)",
            "GET /api": "Get file info (query param ?url=share_link)",
            "GET /proxy": "Download file proxy (?url=download_url&file_name=filename)",
            "GET /health": "Health check",
        },
        "example": {
            "method": "GET",
            "url": "/api?url=https://terabox.com/s/1abc123",
        },
    }))
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache = state.cache.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache,
    })
}

/// Fallback for unknown routes
async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "path": uri.path(),
            "available_endpoints": {
                "POST /": "Send JSON body with 'link' field",
                "GET /api": "Use ?url=your_share_link",
                "GET /proxy": "Use ?url=download_url&file_name=filename",
                "GET /health": "Health check",
            },
        })),
    )
        .into_response()
}
