use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use terabox_resolver::ResolveError;

/// Application error type that converts to HTTP responses
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    BadGateway(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}
