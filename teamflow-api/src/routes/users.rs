/// User profile and administration endpoints
///
/// # Endpoints
///
/// - `GET /users/me` - Current user's profile
/// - `PUT /users/me` - Update own profile (name, bio, password)
/// - `PATCH /users/avatar` - Update own avatar path
/// - `GET /users` - List all users (admin/manager)
/// - `GET /users/with-activity` - Per-user activity sums (admin/manager)
/// - `POST /users` - Provision a user with a temporary password (admin)
/// - `DELETE /users/:id` - Delete a user and dependent rows (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teamflow_shared::{
    auth::{context::AuthContext, password},
    models::{
        activity::ActivityLog,
        user::{CreateUser, UpdateUser, User, UserProfile, UserRole},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Update own profile request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,

    /// Replacement password; checked against the policy and re-hashed
    pub password: Option<String>,
}

/// Avatar update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAvatarRequest {
    #[serde(rename = "avatarPath")]
    #[validate(length(min = 1, max = 500, message = "Avatar path must be 1-500 characters"))]
    pub avatar_path: String,
}

/// Provision user request (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Any role may be assigned here, including admin
    pub role: Option<UserRole>,
}

/// Date range for the per-user activity listing
#[derive(Debug, Deserialize)]
pub struct UserActivityQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(rename = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
}

/// Per-user activity sums, labeled by email
#[derive(Debug, Serialize)]
pub struct UserActivityResponse {
    pub email: String,

    #[serde(rename = "mouseClicks")]
    pub mouse_clicks: i64,

    #[serde(rename = "keyPresses")]
    pub key_presses: i64,

    #[serde(rename = "mouseMovements")]
    pub mouse_movements: i64,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// Current user's profile
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Update own profile with partial-merge semantics
///
/// A password change runs through the same policy as registration and
/// stores a fresh Argon2id hash.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppJson(req): AppJson<UpdateMeRequest>,
) -> ApiResult<Json<UserProfile>> {
    req.validate()?;

    let password_hash = match req.password {
        Some(ref new_password) => {
            password::validate_password_policy(new_password).map_err(|e| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message: e,
                }])
            })?;
            Some(password::hash_password(new_password)?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            name: req.name,
            bio: req.bio,
            password_hash,
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Update own avatar path
pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppJson(req): AppJson<UpdateAvatarRequest>,
) -> ApiResult<Json<UserProfile>> {
    req.validate()?;

    let user = User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            avatar_path: Some(req.avatar_path),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// List all users (admin/manager)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    auth.require_role(UserRole::Manager)?;

    let users = User::list(&state.db).await?;
    let profiles = users.into_iter().map(UserProfile::from).collect();

    Ok(Json(profiles))
}

/// Per-user interaction sums over a required date range (admin/manager)
pub async fn list_users_with_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<UserActivityQuery>,
) -> ApiResult<Json<Vec<UserActivityResponse>>> {
    auth.require_role(UserRole::Manager)?;

    let (start, end) = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(ApiError::BadRequest(
                "startDate and endDate are required".to_string(),
            ))
        }
    };

    let stats = ActivityLog::per_user_stats(&state.db, start, end).await?;
    let rows = stats
        .into_iter()
        .map(|s| UserActivityResponse {
            email: s.email,
            mouse_clicks: s.mouse_clicks,
            key_presses: s.key_presses,
            mouse_movements: s.mouse_movements,
        })
        .collect();

    Ok(Json(rows))
}

/// Provision a user account (admin only)
///
/// A policy-compliant temporary password is generated server-side and
/// delivered through the mailer; only its hash is stored.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    auth.require_role(UserRole::Admin)?;
    req.validate()?;

    let temporary_password = password::generate_temporary_password();
    let password_hash = password::hash_password(&temporary_password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            name: req.name,
            role: req.role.unwrap_or(UserRole::Worker),
            password_hash,
        },
    )
    .await?;

    state
        .mailer
        .send_temporary_password(&user.email, &temporary_password)
        .await?;

    Ok(Json(user.into()))
}

/// Delete a user (admin only)
///
/// The user's activity rows, notifications and the user row itself go in
/// one transaction, so a crash cannot leave a half-deleted account.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    auth.require_role(UserRole::Admin)?;

    if id == auth.user_id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    let deleted = User::delete_cascade(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(DeletedResponse { deleted }))
}
