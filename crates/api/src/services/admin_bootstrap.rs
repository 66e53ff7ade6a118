//! First-admin bootstrap.
//!
//! Creates an admin account on startup when `admin.bootstrap_*` is
//! configured and no admin exists yet. Safe to run on every boot.

use domain::models::Role;
use persistence::repositories::UserRepository;
use shared::password::{check_policy, hash_password, PasswordError};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
}

/// What the bootstrap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AdminExists,
    Created(i64),
}

pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    let username = config.bootstrap_username.trim();
    let email = config.bootstrap_email.trim().to_lowercase();
    if username.is_empty() || email.is_empty() {
        return Ok(BootstrapOutcome::NotConfigured);
    }
    if config.bootstrap_password.is_empty() {
        warn!("AQ__ADMIN__BOOTSTRAP_USERNAME is set but the password is empty; skipping bootstrap");
        return Ok(BootstrapOutcome::NotConfigured);
    }
    check_policy(&config.bootstrap_password)?;

    let admin_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')
            OR EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)
        "#,
    )
    .bind(username)
    .bind(&email)
    .fetch_one(pool)
    .await?;

    if admin_exists {
        info!("Admin or bootstrap account already exists; skipping bootstrap");
        return Ok(BootstrapOutcome::AdminExists);
    }

    let password_hash = hash_password(&config.bootstrap_password)?;
    let user = UserRepository::new(pool.clone())
        .create(username, &email, &password_hash, Role::Admin.as_str())
        .await?;

    info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
    warn!("SECURITY: remove AQ__ADMIN__BOOTSTRAP_PASSWORD from the environment after initial setup");
    Ok(BootstrapOutcome::Created(user.id))
}
