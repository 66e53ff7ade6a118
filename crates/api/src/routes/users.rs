//! Admin user management.
//!
//! GET    /api/users[?id=][&search=][&role=][&status=active|banned][&page=][&limit=]
//! POST   /api/users
//! PUT    /api/users?id=&action=ban|activate|promote|demote
//! PUT    /api/users?id=   `{username?, email?, password?, role?}`
//! DELETE /api/users?id=

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use domain::models::user::{check_self_protection, UserStatusFilter};
use domain::models::{AdminAction, CreateUserRequest, Role, UpdateUserRequest, User, UserListQuery};
use persistence::repositories::{UserChanges, UserFilter, UserRepository};
use serde::{Deserialize, Serialize};
use shared::password::hash_password;
use std::str::FromStr;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::response::{ApiResponse, Page};
use crate::services::AuthError;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UsersData {
    One(User),
    List(Page<User>),
}

pub async fn get_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<UserListQuery>,
) -> Result<ApiResponse<UsersData>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());

    if let Some(id) = query.id {
        let user = find_user(&repo, id).await?;
        return Ok(ApiResponse::ok(UsersData::One(user)));
    }

    let (limit, offset) = query.page_bounds();
    let filter = UserFilter {
        search: query.search_pattern(),
        role: query.role.map(|r| r.as_str().to_string()),
        is_active: query.status.map(|s| s == UserStatusFilter::Active),
        limit,
        offset,
    };
    let (users, total) = repo.list(&filter).await?;
    let items = users.into_iter().map(Into::into).collect();

    Ok(ApiResponse::ok(UsersData::List(Page::new(
        items, total, limit, offset,
    ))))
}

pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<ApiResponse<User>, ApiError> {
    request.validate()?;
    let repo = UserRepository::new(state.pool.clone());

    if let Some(field) = repo
        .find_conflict(Some(&request.username), Some(&request.email), None)
        .await?
    {
        return Err(AuthError::from(field).into());
    }

    let password_hash = hash_password(&request.password)?;
    let role = request.role.unwrap_or(Role::User);
    let user: User = repo
        .create(&request.username, &request.email, &password_hash, role.as_str())
        .await?
        .into();

    tracing::info!(admin_id = admin.id, user_id = user.id, role = %role, "User created");
    Ok(ApiResponse::created(user))
}

#[derive(Debug, Deserialize)]
pub struct UserTargetQuery {
    pub id: Option<i64>,
    pub action: Option<String>,
}

impl UserTargetQuery {
    fn target_id(&self) -> Result<i64, ApiError> {
        self.id
            .ok_or_else(|| ApiError::Validation("id is required".to_string()))
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<UserTargetQuery>,
    body: Bytes,
) -> Result<ApiResponse<User>, ApiError> {
    let id = query.target_id()?;
    let repo = UserRepository::new(state.pool.clone());

    if let Some(action) = query.action.as_deref() {
        let action = AdminAction::from_str(action).map_err(ApiError::Validation)?;
        let role = match action {
            AdminAction::Promote => Some(Role::Admin),
            AdminAction::Demote => Some(Role::User),
            AdminAction::Ban | AdminAction::Activate => None,
            AdminAction::Delete | AdminAction::ChangeRole => {
                return Err(ApiError::Validation(format!("Invalid user action: {}", action)));
            }
        };
        check_self_protection(admin.id, id, action).map_err(ApiError::Validation)?;

        let updated = match role {
            Some(role) => {
                let changes = UserChanges {
                    role: Some(role.as_str()),
                    ..Default::default()
                };
                repo.update(id, &changes).await?
            }
            None => repo.set_active(id, action == AdminAction::Activate).await?,
        };
        let user: User = updated
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
            .into();

        tracing::info!(admin_id = admin.id, user_id = id, action = %action, "User action applied");
        return Ok(ApiResponse::ok(user));
    }

    let request: UpdateUserRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))?;
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let target = find_user(&repo, id).await?;
    if let Some(role) = request.role {
        if role != target.role {
            check_self_protection(admin.id, id, AdminAction::ChangeRole)
                .map_err(ApiError::Validation)?;
        }
    }

    if let Some(field) = repo
        .find_conflict(request.username.as_deref(), request.email.as_deref(), Some(id))
        .await?
    {
        return Err(AuthError::from(field).into());
    }

    let password_hash = request
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;
    let changes = UserChanges {
        username: request.username.as_deref(),
        email: request.email.as_deref(),
        password_hash: password_hash.as_deref(),
        role: request.role.as_ref().map(Role::as_str),
    };

    let user: User = repo
        .update(id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();

    tracing::info!(admin_id = admin.id, user_id = id, "User updated");
    Ok(ApiResponse::ok(user))
}

#[derive(Debug, Serialize)]
pub struct DeletedUser {
    pub id: i64,
    pub deleted: bool,
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<UserTargetQuery>,
) -> Result<ApiResponse<DeletedUser>, ApiError> {
    let id = query.target_id()?;
    check_self_protection(admin.id, id, AdminAction::Delete).map_err(ApiError::Validation)?;

    let deleted = UserRepository::new(state.pool.clone()).delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(admin_id = admin.id, user_id = id, "User deleted");
    Ok(ApiResponse::ok(DeletedUser { id, deleted }))
}

async fn find_user(repo: &UserRepository, id: i64) -> Result<User, ApiError> {
    repo.find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}
