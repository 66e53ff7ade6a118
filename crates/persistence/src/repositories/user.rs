//! User repository for database operations.

use sqlx::PgPool;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, is_active, last_login_at, created_at";

/// Which unique field an existing account already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

/// Filters for [`UserRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// `ILIKE` pattern matched against username and email.
    pub search: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

/// Column changes for [`UserRepository::update`]; `None` keeps the value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: Option<&'a str>,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by username or, failing that, by email address.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_login");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE username = $1 OR email = LOWER($1)
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
            USER_COLUMNS
        ))
        .bind(login.trim())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Reports which unique field, if any, is already taken by another user.
    pub async fn find_conflict(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<i64>,
    ) -> Result<Option<UniqueField>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_conflict");
        let row: Option<(bool,)> = sqlx::query_as(
            r#"
            SELECT COALESCE(username = $1, false) AS username_taken
            FROM users
            WHERE (username = $1 OR email = LOWER($2))
              AND ($3::BIGINT IS NULL OR id <> $3)
            ORDER BY username_taken DESC
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        Ok(row.map(|(username_taken,)| {
            if username_taken {
                UniqueField::Username
            } else {
                UniqueField::Email
            }
        }))
    }

    /// Create a new user account with default settings.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, role, is_active)
            VALUES ($1, LOWER($2), $3, $4, true)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_settings (user_id) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(user)
    }

    /// Apply partial changes to an account.
    pub async fn update(
        &self,
        id: i64,
        changes: &UserChanges<'_>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE(LOWER($3), email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.role)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Flip the active flag (ban / activate).
    pub async fn set_active(
        &self,
        id: i64,
        is_active: bool,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_user_active");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Hard-delete an account. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Update user's last login timestamp.
    pub async fn update_last_login(&self, id: i64) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_user_last_login");
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(())
    }

    /// List users newest first, with the total matching count.
    pub async fn list(&self, filter: &UserFilter) -> Result<(Vec<UserEntity>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_users");
        let rows = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE ($1::TEXT IS NULL OR username ILIKE $1 OR email ILIKE $1)
              AND ($2::TEXT IS NULL OR role = $2)
              AND ($3::BOOLEAN IS NULL OR is_active = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
            USER_COLUMNS
        ))
        .bind(filter.search.as_deref())
        .bind(filter.role.as_deref())
        .bind(filter.is_active)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE ($1::TEXT IS NULL OR username ILIKE $1 OR email ILIKE $1)
              AND ($2::TEXT IS NULL OR role = $2)
              AND ($3::BOOLEAN IS NULL OR is_active = $3)
            "#,
        )
        .bind(filter.search.as_deref())
        .bind(filter.role.as_deref())
        .bind(filter.is_active)
        .fetch_one(&self.pool)
        .await?;

        timer.record();
        Ok((rows, total))
    }
}
