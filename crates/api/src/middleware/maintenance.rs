//! Maintenance-mode gate.
//!
//! While `system_settings.maintenance_mode` is on, every request from a
//! non-admin caller is answered with 503. Authentication, the status probes,
//! metrics and reading the system settings stay reachable so clients can
//! discover the state and admins can log in to switch it off.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::Role;
use persistence::repositories::SystemSettingsRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::bearer_token;

pub const MAINTENANCE_MESSAGE: &str = "System is under maintenance. Please try again later.";

fn is_exempt(method: &Method, path: &str) -> bool {
    path.starts_with("/api/auth")
        || path.starts_with("/api/status")
        || path == "/metrics"
        || (path == "/api/system_settings" && method == Method::GET)
}

pub async fn maintenance_guard(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if is_exempt(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    let enabled = match SystemSettingsRepository::new(state.pool.clone())
        .maintenance_mode()
        .await
    {
        Ok(enabled) => enabled,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read maintenance flag; allowing request");
            false
        }
    };
    if !enabled {
        return next.run(req).await;
    }

    // Role comes from the signed claims; the handler re-checks the account.
    let is_admin = bearer_token(req.headers())
        .and_then(|token| state.jwt.validate(token).ok())
        .is_some_and(|claims| claims.role == Role::Admin.as_str());
    if is_admin {
        return next.run(req).await;
    }

    ApiError::ServiceUnavailable(MAINTENANCE_MESSAGE.to_string()).into_response()
}
