/// Activity ledger endpoints
///
/// # Endpoints
///
/// - `POST /activity` - Record one activity event (any authenticated user)
/// - `GET /activity/stats` - Aggregate counters over a range (admin/manager)
/// - `GET /activity/pdf` - Rendered PDF activity report (admin/manager)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teamflow_shared::{
    auth::context::AuthContext,
    models::{
        activity::{self, ActivityLog, ActivityPayload, RecordActivity},
        user::{User, UserRole},
    },
    report::{self, ReportScope, ReportSummary},
};
use uuid::Uuid;

/// Record activity request
///
/// The payload is tagged by `type`: `user-activity` carries the three
/// interaction counters, `window-switch` carries title/url/isAiTool.
/// Missing payload fields are rejected during deserialization.
#[derive(Debug, Deserialize)]
pub struct RecordActivityRequest {
    /// When the event happened on the client
    pub timestamp: DateTime<Utc>,

    /// Client-generated id; resubmitting the same id is a no-op
    #[serde(rename = "clientEventId")]
    pub client_event_id: Option<Uuid>,

    #[serde(flatten)]
    pub payload: ActivityPayload,
}

/// Record activity response
#[derive(Debug, Serialize)]
pub struct RecordActivityResponse {
    /// False when the clientEventId was already seen
    pub recorded: bool,
}

/// Stats and report query parameters
///
/// Both date bounds are required; requests without them are rejected
/// before any row is fetched.
#[derive(Debug, Deserialize)]
pub struct ActivityRangeQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(rename = "endDate")]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
}

impl ActivityRangeQuery {
    fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(ApiError::BadRequest(
                "startDate and endDate are required".to_string(),
            )),
        }
    }
}

/// Aggregate stats response
#[derive(Debug, Serialize)]
pub struct ActivityStatsResponse {
    #[serde(rename = "mouseClicks")]
    pub mouse_clicks: i64,

    #[serde(rename = "keyPresses")]
    pub key_presses: i64,

    #[serde(rename = "mouseMovements")]
    pub mouse_movements: i64,

    pub total: i64,

    #[serde(rename = "averageActivityPerHour")]
    pub average_activity_per_hour: i64,
}

/// Record one activity event for the calling user
///
/// The ledger is append-only; events are never updated or deleted here.
/// A duplicate clientEventId is acknowledged without inserting a second
/// row, so at-least-once client flushing does not inflate the counters.
pub async fn record_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppJson(req): AppJson<RecordActivityRequest>,
) -> ApiResult<Json<RecordActivityResponse>> {
    let recorded = ActivityLog::append(
        &state.db,
        RecordActivity {
            user_id: auth.user_id,
            recorded_at: req.timestamp,
            payload: req.payload,
            client_event_id: req.client_event_id,
        },
    )
    .await?;

    Ok(Json(RecordActivityResponse { recorded }))
}

/// Aggregate interaction counters over a closed date range (admin/manager)
///
/// Sums the three counters over `user-activity` rows, optionally scoped
/// to one user, and derives the per-hour average from the range length.
/// An empty range yields zeros.
pub async fn activity_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ActivityRangeQuery>,
) -> ApiResult<Json<ActivityStatsResponse>> {
    auth.require_role(UserRole::Manager)?;
    let (start, end) = query.bounds()?;

    let stats = ActivityLog::aggregate_stats(&state.db, start, end, query.user_id).await?;
    let total = stats.total();

    Ok(Json(ActivityStatsResponse {
        mouse_clicks: stats.mouse_clicks,
        key_presses: stats.key_presses,
        mouse_movements: stats.mouse_movements,
        total,
        average_activity_per_hour: activity::average_per_hour(total, start, end),
    }))
}

/// Rendered PDF activity report over a closed date range (admin/manager)
///
/// Returns the document itself as `application/pdf` with an attachment
/// filename, not a JSON envelope.
pub async fn activity_pdf(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ActivityRangeQuery>,
) -> ApiResult<Response> {
    auth.require_role(UserRole::Manager)?;
    let (start, end) = query.bounds()?;

    // The user lookup and the row fetch are independent; dispatch both
    let (user, rows) = tokio::try_join!(
        async {
            match query.user_id {
                Some(user_id) => User::find_by_id(&state.db, user_id).await.map(Some),
                None => Ok(None),
            }
        },
        ActivityLog::list_range(&state.db, start, end, query.user_id),
    )?;

    let user_label = match (query.user_id, user.flatten()) {
        (Some(_), Some(u)) => Some(u.email),
        (Some(_), None) => return Err(ApiError::NotFound("User not found".to_string())),
        (None, _) => None,
    };
    let summary = ReportSummary::from_rows(&rows);
    let scope = ReportScope {
        user_label,
        start,
        end,
    };

    let bytes = report::render_pdf(&scope, &summary, &rows)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"activity-report.pdf\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
