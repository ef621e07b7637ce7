/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Password reset (request + redeem)
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/login` - Login and get a token
/// - `POST /auth/forgot-password` - Request a password reset
/// - `POST /auth/reset-password` - Redeem a reset token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson, ValidationErrorDetail},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use teamflow_shared::{
    auth::{jwt, password, reset},
    models::user::{CreateUser, User, UserProfile, UserRole},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated against the password policy)
    pub password: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Requested role; anything outside worker/manager is forced to worker
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Response for register and login: the profile plus a signed token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserProfile,

    /// Access token (24h)
    pub token: String,
}

/// Forgot password request
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset password request
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// Raw reset token from the email link
    pub token: String,

    /// Replacement password
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Generic acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new user
///
/// Creates a user account and returns the profile with a signed token.
/// A requested role outside worker/manager is silently downgraded to
/// worker; admin accounts are only created through user administration.
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `400 Bad Request`: Validation or password policy failed
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    password::validate_password_policy(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let role = UserRole::sanitize_registration(req.role.as_deref());
    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            name: req.name,
            role,
            password_hash,
        },
    )
    .await?;

    let claims = jwt::Claims::new(user.id, user.email.clone(), user.role);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Login endpoint
///
/// Authenticates a user and returns the profile with a signed token.
/// Unknown email and wrong password produce the same error so the
/// response does not reveal which accounts exist.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let claims = jwt::Claims::new(user.id, user.email.clone(), user.role);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Password reset request endpoint
///
/// Always answers with the same generic 200 whether or not the email is
/// known, to prevent account enumeration. When the account exists a
/// short-lived reset token is stored (digest only) and the raw token is
/// dispatched through the mailer.
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if let Some(user) = User::find_by_email(&state.db, &req.email).await? {
        let reset_token = reset::generate_reset_token();

        User::set_reset_token(
            &state.db,
            user.id,
            &reset_token.token_hash,
            reset_token.expires_at,
        )
        .await?;

        // Mail failures are logged, not surfaced; the response must stay
        // indistinguishable from the unknown-email case.
        if let Err(err) = state
            .mailer
            .send_password_reset(&user.email, &reset_token.token)
            .await
        {
            tracing::warn!(error = %err, "Failed to dispatch password reset mail");
        }
    }

    Ok(Json(MessageResponse {
        message: "If the email exists, a reset link has been sent".to_string(),
    }))
}

/// Password reset redemption endpoint
///
/// Validates the raw token against the stored digest and its expiry,
/// then replaces the password hash and clears the reset columns.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown or expired token
/// - `400 Bad Request`: New password fails the policy
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    password::validate_password_policy(&req.new_password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "newPassword".to_string(),
            message: e,
        }])
    })?;

    let token_hash = reset::hash_reset_token(&req.token);

    let user = User::find_by_reset_token_hash(&state.db, &token_hash)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    let still_valid = user
        .reset_token_expires_at
        .map(reset::is_reset_token_valid)
        .unwrap_or(false);
    if !still_valid {
        return Err(ApiError::BadRequest(
            "Invalid or expired reset token".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.new_password)?;
    User::redeem_reset_token(&state.db, user.id, &password_hash).await?;

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}
