/// Notification endpoints
///
/// # Endpoints
///
/// - `GET /notifications` - Caller's notifications, newest first, capped
/// - `POST /notifications` - Append a notification

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
};
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use teamflow_shared::{
    auth::context::AuthContext,
    models::{notification::Notification, user::UserRole},
};
use uuid::Uuid;
use validator::Validate;

/// Create notification request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    #[validate(length(min = 1, max = 1000, message = "Message must be 1-1000 characters"))]
    pub message: String,

    /// Target user; defaults to the caller. Targeting someone else
    /// requires admin/manager.
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
}

/// List the caller's notifications, newest first (capped at 50)
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = Notification::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(notifications))
}

/// Append a notification
pub async fn create_notification(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppJson(req): AppJson<CreateNotificationRequest>,
) -> ApiResult<Json<Notification>> {
    req.validate()?;

    let target = req.user_id.unwrap_or(auth.user_id);
    if target != auth.user_id {
        auth.require_role(UserRole::Manager)
            .map_err(|_| ApiError::Forbidden("Cannot notify other users".to_string()))?;
    }

    let notification = Notification::create(&state.db, target, &req.message).await?;

    Ok(Json(notification))
}
