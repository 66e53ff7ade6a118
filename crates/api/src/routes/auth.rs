//! Authentication endpoints.
//!
//! POST /api/auth?action=register|login
//! GET  /api/auth?action=me

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{LoginRequest, RegisterRequest, User};
use serde::Deserialize;
use validator::Validate;

use super::parse_body;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::response::ApiResponse;
use crate::services::{AuthResult, AuthService};

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub action: Option<String>,
}

pub async fn post_auth(
    State(state): State<AppState>,
    Query(query): Query<AuthQuery>,
    Json(body): Json<serde_json::Value>,
) -> Result<ApiResponse<AuthResult>, ApiError> {
    let service = AuthService::new(state.pool.clone(), state.jwt.clone());

    match query.action.as_deref() {
        Some("register") => {
            let request: RegisterRequest = parse_body(body)?;
            request.validate()?;
            let result = service.register(&request).await?;
            Ok(ApiResponse::created(result))
        }
        Some("login") => {
            let request: LoginRequest = parse_body(body)?;
            request.validate()?;
            let result = service.login(&request).await?;
            Ok(ApiResponse::ok(result))
        }
        Some(other) => Err(ApiError::Validation(format!("Invalid action: {}", other))),
        None => Err(ApiError::Validation("action is required".to_string())),
    }
}

pub async fn get_auth(
    Query(query): Query<AuthQuery>,
    CurrentUser(user): CurrentUser,
) -> Result<ApiResponse<User>, ApiError> {
    match query.action.as_deref() {
        None | Some("me") => Ok(ApiResponse::ok(user)),
        Some(other) => Err(ApiError::Validation(format!("Invalid action: {}", other))),
    }
}
