//! Bearer-token extractors.
//!
//! [`CurrentUser`] validates the token, then re-reads the account so a
//! deleted or banned user is rejected even while their token is unexpired.
//! [`AdminUser`] additionally requires the admin role.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use domain::models::User;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::AuthService;

/// Returns the token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolves the caller of a request.
pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<User, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let user = AuthService::new(state.pool.clone(), state.jwt.clone())
        .authenticate(token)
        .await?;
    Ok(user)
}

/// Resolves the caller and requires the admin role.
pub async fn authenticate_admin(headers: &HeaderMap, state: &AppState) -> Result<User, ApiError> {
    let user = authenticate(headers, state).await?;
    if !user.role.is_admin() {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }
    Ok(user)
}

#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state).await.map(CurrentUser)
    }
}

#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate_admin(&parts.headers, state).await.map(AdminUser)
    }
}

/// Best-effort client address from proxy headers.
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip(&parts.headers)))
    }
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim);
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim);

    forwarded
        .filter(|ip| !ip.is_empty())
        .or(real_ip.filter(|ip| !ip.is_empty()))
        .map(|ip| ip.chars().take(64).collect())
}
