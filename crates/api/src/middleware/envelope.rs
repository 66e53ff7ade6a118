//! Rewrites framework-generated error responses into the JSON envelope.
//!
//! Extractor rejections, unknown methods, body-limit and timeout responses are
//! produced by axum and tower-http as plain text or empty bodies. Handler
//! errors already carry the envelope and pass through untouched.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ApiError;
use crate::response::Envelope;

const MAX_REJECTION_BODY: usize = 16 * 1024;

/// Status code clients see for a framework error.
pub fn normalize_status(status: StatusCode) -> StatusCode {
    match status {
        StatusCode::UNPROCESSABLE_ENTITY
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNSUPPORTED_MEDIA_TYPE
        | StatusCode::LENGTH_REQUIRED => StatusCode::BAD_REQUEST,
        StatusCode::REQUEST_TIMEOUT => StatusCode::SERVICE_UNAVAILABLE,
        other => other,
    }
}

fn fallback_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed",
        StatusCode::NOT_FOUND => "Endpoint not found",
        StatusCode::PAYLOAD_TOO_LARGE => "Request body too large",
        StatusCode::REQUEST_TIMEOUT => "Request timed out",
        StatusCode::UNAUTHORIZED => "Authentication required",
        _ => "Invalid request",
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

pub async fn json_error_envelope(req: Request<Body>, next: Next) -> Response {
    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let original_status = status;
    let text = match to_bytes(response.into_body(), MAX_REJECTION_BODY).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Err(_) => String::new(),
    };
    let message = match original_status {
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::REQUEST_TIMEOUT => {
            fallback_message(original_status).to_string()
        }
        _ if text.is_empty() => fallback_message(original_status).to_string(),
        _ => text,
    };

    (
        normalize_status(original_status),
        Json(Envelope::<()>::failure(message)),
    )
        .into_response()
}

/// Router fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint not found".to_string())
}
