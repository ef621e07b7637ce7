/// User model and database operations
///
/// Users carry one of three roles forming the permission lattice
/// worker < manager < admin. Every authorization decision in the API is a
/// check against this lattice plus, for workers, task ownership.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'manager', 'worker');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     name VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'worker',
///     password_hash VARCHAR(255) NOT NULL,
///     bio TEXT,
///     avatar_path VARCHAR(512),
///     reset_token_hash VARCHAR(64),
///     reset_token_expires_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// The three account roles
///
/// Ordered worker < manager < admin. Managers and admins run projects and
/// tasks; only admins manage accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full control: account management, everything managers can do
    Admin,

    /// Can create/update/delete projects and tasks, view analytics
    Manager,

    /// Can view and update only tasks assigned to them
    Worker,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Worker => "worker",
        }
    }

    /// Position in the lattice, higher = more privileged
    fn rank(&self) -> u8 {
        match self {
            UserRole::Worker => 0,
            UserRole::Manager => 1,
            UserRole::Admin => 2,
        }
    }

    /// Checks whether this role is at least as privileged as `other`
    pub fn is_at_least(&self, other: UserRole) -> bool {
        self.rank() >= other.rank()
    }

    /// Can create, reassign, and delete tasks and projects
    pub fn can_manage_work(&self) -> bool {
        self.is_at_least(UserRole::Manager)
    }

    /// Can create accounts and view other users' data
    pub fn can_manage_users(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Resolves a self-registration role request
    ///
    /// Anything outside {worker, manager} - including "admin" and arbitrary
    /// strings - is forced down to worker. Admin accounts are only created
    /// by an existing admin.
    pub fn sanitize_registration(requested: Option<&str>) -> UserRole {
        match requested {
            Some("manager") => UserRole::Manager,
            Some("worker") | None => UserRole::Worker,
            Some(_) => UserRole::Worker,
        }
    }
}

/// User model representing an account
///
/// The password hash and reset credential never leave the server; routes
/// return [`UserProfile`] instead.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique, stored as given
    pub email: String,

    /// Display name
    pub name: String,

    /// Account role
    pub role: UserRole,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional free-form bio
    pub bio: Option<String>,

    /// Optional stored avatar path
    pub avatar_path: Option<String>,

    /// SHA-256 digest of the outstanding reset credential, if any
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,

    /// When the outstanding reset credential expires
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// The externally visible view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub bio: Option<String>,
    pub avatar_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            bio: user.bio,
            avatar_path: user.avatar_path,
            created_at: user.created_at,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Argon2id password hash (never a plaintext password)
    pub password_hash: String,
}

/// Input for updating an existing user
///
/// All fields are optional. Only `Some` fields are written; everything
/// else keeps its previous value.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_path: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
}

const USER_COLUMNS: &str = "id, email, name, role, password_hash, bio, avatar_path, \
     reset_token_hash, reset_token_expires_at, created_at, updated_at, last_login_at";

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Surfaces the unique-constraint violation when the email already
    /// exists; the API layer maps it to `Conflict`.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.email)
        .bind(data.name)
        .bind(data.role)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email (exact match, as stored)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user holding an outstanding reset credential
    pub async fn find_by_reset_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reset_token_hash = $1",
        ))
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user with partial-merge semantics
    ///
    /// Only `Some` fields are updated; `updated_at` is always refreshed.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the id is unknown
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the SET list from the fields that are present; clause text
        // is static, values always go through binds.
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.bio.is_some() {
            bind_count += 1;
            query.push_str(&format!(", bio = ${}", bind_count));
        }
        if data.avatar_path.is_some() {
            bind_count += 1;
            query.push_str(&format!(", avatar_path = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(bio) = data.bio {
            q = q.bind(bio);
        }
        if let Some(avatar_path) = data.avatar_path {
            q = q.bind(avatar_path);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Stores a reset credential digest and its expiry on the user row
    pub async fn set_reset_token(
        pool: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $2,
                reset_token_expires_at = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the password hash and clears the reset credential in one statement
    pub async fn redeem_reset_token(
        pool: &PgPool,
        id: Uuid,
        new_password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                reset_token_hash = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(new_password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates the last login timestamp, called after successful authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all users, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC",
        ))
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Deletes a user together with their dependent rows
    ///
    /// The activity ledger, notifications, and the user row are removed in
    /// one transaction, so a crash mid-way never leaves a half-deleted
    /// account behind.
    ///
    /// # Returns
    ///
    /// True if the user existed and was deleted
    pub async fn delete_cascade(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM activity_logs WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::Manager.as_str(), "manager");
        assert_eq!(UserRole::Worker.as_str(), "worker");
    }

    #[test]
    fn test_role_lattice_ordering() {
        assert!(UserRole::Admin.is_at_least(UserRole::Manager));
        assert!(UserRole::Admin.is_at_least(UserRole::Worker));
        assert!(UserRole::Manager.is_at_least(UserRole::Worker));
        assert!(!UserRole::Worker.is_at_least(UserRole::Manager));
        assert!(!UserRole::Manager.is_at_least(UserRole::Admin));
        assert!(UserRole::Worker.is_at_least(UserRole::Worker));
    }

    #[test]
    fn test_role_capabilities() {
        assert!(UserRole::Admin.can_manage_work());
        assert!(UserRole::Manager.can_manage_work());
        assert!(!UserRole::Worker.can_manage_work());

        assert!(UserRole::Admin.can_manage_users());
        assert!(!UserRole::Manager.can_manage_users());
        assert!(!UserRole::Worker.can_manage_users());
    }

    #[test]
    fn test_sanitize_registration_allows_worker_and_manager() {
        assert_eq!(
            UserRole::sanitize_registration(Some("worker")),
            UserRole::Worker
        );
        assert_eq!(
            UserRole::sanitize_registration(Some("manager")),
            UserRole::Manager
        );
    }

    #[test]
    fn test_sanitize_registration_forces_everything_else_to_worker() {
        assert_eq!(
            UserRole::sanitize_registration(Some("admin")),
            UserRole::Worker
        );
        assert_eq!(
            UserRole::sanitize_registration(Some("superuser")),
            UserRole::Worker
        );
        assert_eq!(UserRole::sanitize_registration(None), UserRole::Worker);
    }

    #[test]
    fn test_profile_hides_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            name: "U".to_string(),
            role: UserRole::Worker,
            password_hash: "$argon2id$secret".to_string(),
            bio: None,
            avatar_path: None,
            reset_token_hash: Some("digest".to_string()),
            reset_token_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let profile = UserProfile::from(user);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("digest"));
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            name: "U".to_string(),
            role: UserRole::Worker,
            bio: None,
            avatar_path: Some("/avatars/u.png".to_string()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["avatarPath"], "/avatars/u.png");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("avatar_path").is_none());
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.name.is_none());
        assert!(update.bio.is_none());
        assert!(update.avatar_path.is_none());
        assert!(update.password_hash.is_none());
        assert!(update.role.is_none());
    }
}
