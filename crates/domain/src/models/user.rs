//! User account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user account in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)] // Never serialize password hash to API responses
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Self-registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
}

/// Login payload; `username` also accepts an email address.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Admin payload for creating an account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Option<Role>,
}

/// Admin payload for editing an account. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: Option<String>,

    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role.is_none()
    }
}

/// Admin operations on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminAction {
    Ban,
    Activate,
    Promote,
    Demote,
    Delete,
    ChangeRole,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::Ban => "ban",
            AdminAction::Activate => "activate",
            AdminAction::Promote => "promote",
            AdminAction::Demote => "demote",
            AdminAction::Delete => "delete",
            AdminAction::ChangeRole => "change_role",
        }
    }

    /// Actions an admin may not apply to their own account.
    pub fn is_self_protected(&self) -> bool {
        !matches!(self, AdminAction::Activate)
    }
}

impl FromStr for AdminAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ban" => Ok(AdminAction::Ban),
            "activate" | "unban" => Ok(AdminAction::Activate),
            "promote" => Ok(AdminAction::Promote),
            "demote" => Ok(AdminAction::Demote),
            "delete" => Ok(AdminAction::Delete),
            _ => Err(format!("Invalid user action: {}", s)),
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rejects self-targeted protected actions with a user-facing message.
pub fn check_self_protection(
    actor_id: i64,
    target_id: i64,
    action: AdminAction,
) -> Result<(), String> {
    if actor_id == target_id && action.is_self_protected() {
        let verb = match action {
            AdminAction::Ban => "ban",
            AdminAction::Promote => "promote",
            AdminAction::Demote => "demote",
            AdminAction::Delete => "delete",
            AdminAction::ChangeRole => "change the role of",
            AdminAction::Activate => "activate",
        };
        return Err(format!("You cannot {} your own account", verb));
    }
    Ok(())
}

/// Account status filter for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatusFilter {
    Active,
    Banned,
}

/// User listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub id: Option<i64>,
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatusFilter>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl UserListQuery {
    /// Returns `(limit, offset)` with limit clamped to `1..=100`.
    pub fn page_bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(50).clamp(1, 100);
        let page = self.page.unwrap_or(1).max(1);
        (limit, (page - 1).saturating_mul(limit))
    }

    /// Search term wrapped for `ILIKE`, or `None` when blank.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                let escaped = s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
                format!("%{}%", escaped)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 7,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "secret_hash".into(),
            role: Role::User,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_roundtrip() {
        assert_eq!(Role::from_str("ADMIN").unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "user");
        assert!(Role::from_str("root").is_err());
        assert!(Role::Admin.is_admin());
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let json = serde_json::to_string(&user()).unwrap();
        assert!(!json.contains("secret_hash"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_register_validation() {
        let ok = RegisterRequest {
            username: "nguyen_a".into(),
            email: "a@example.com".into(),
            password: "hunter22".into(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "nope".into(),
            ..ok.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_pw = RegisterRequest {
            password: "12345".into(),
            ..ok.clone()
        };
        assert!(short_pw.validate().is_err());

        let bad_name = RegisterRequest {
            username: "a b".into(),
            ..ok
        };
        assert!(bad_name.validate().is_err());
    }

    #[test]
    fn test_update_request_empty() {
        assert!(UpdateUserRequest::default().is_empty());
        let req = UpdateUserRequest {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert!(!req.is_empty());
    }

    #[test]
    fn test_self_protection() {
        for action in [
            AdminAction::Ban,
            AdminAction::Promote,
            AdminAction::Demote,
            AdminAction::Delete,
            AdminAction::ChangeRole,
        ] {
            assert!(check_self_protection(1, 1, action).is_err(), "{}", action);
            assert!(check_self_protection(1, 2, action).is_ok(), "{}", action);
        }
        assert!(check_self_protection(1, 1, AdminAction::Activate).is_ok());
        assert_eq!(
            check_self_protection(5, 5, AdminAction::Ban).unwrap_err(),
            "You cannot ban your own account"
        );
    }

    #[test]
    fn test_admin_action_from_str() {
        assert_eq!(AdminAction::from_str("unban").unwrap(), AdminAction::Activate);
        assert_eq!(AdminAction::from_str("Promote").unwrap(), AdminAction::Promote);
        assert!(AdminAction::from_str("nuke").is_err());
    }

    #[test]
    fn test_search_pattern() {
        let q = UserListQuery {
            search: Some(" al_ice ".into()),
            ..Default::default()
        };
        assert_eq!(q.search_pattern().as_deref(), Some("%al\\_ice%"));
        assert_eq!(UserListQuery::default().search_pattern(), None);
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(UserListQuery::default().page_bounds(), (50, 0));
        let q = UserListQuery {
            page: Some(i64::MAX),
            limit: Some(100),
            ..Default::default()
        };
        assert_eq!(q.page_bounds(), (100, i64::MAX));
    }
}
