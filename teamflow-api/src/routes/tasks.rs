/// Task board endpoints
///
/// # Endpoints
///
/// - `GET /tasks` - List tasks (workers see only their own)
/// - `POST /tasks` - Create a task (admin/manager)
/// - `PUT /tasks/:id` - Update a task (workers restricted to their own)
/// - `DELETE /tasks/:id` - Delete a task (admin/manager)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use teamflow_shared::{
    auth::context::AuthContext,
    models::{
        task::{CreateTask, Task, TaskFilter, TaskPriority, TaskStatus, TaskWithNames, UpdateTask},
        user::UserRole,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Task list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    /// Filter by status
    pub status: Option<TaskStatus>,

    /// Filter by assignee
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<Uuid>,

    /// Filter by project
    #[serde(rename = "projectId")]
    pub project_id: Option<Uuid>,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,

    /// Defaults to medium when omitted
    pub priority: Option<TaskPriority>,

    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<Uuid>,

    #[serde(rename = "projectId")]
    pub project_id: Option<Uuid>,
}

/// Update task request; omitted fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<Uuid>,

    #[serde(rename = "projectId")]
    pub project_id: Option<Uuid>,

    /// Status transition; `inprogress` and `done` set their paired
    /// timestamps server-side
    pub status: Option<TaskStatus>,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// List tasks, joined with assignee/creator/project names
///
/// Workers only ever see tasks assigned to themselves; their own
/// `assignedTo` filter is overridden. Results are newest-created first.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<TaskWithNames>>> {
    let mut filter = TaskFilter {
        status: query.status,
        assigned_to: query.assigned_to,
        project_id: query.project_id,
    };

    // Role scoping beats the caller's filter
    if auth.role == UserRole::Worker {
        filter.assigned_to = Some(auth.user_id);
    }

    let tasks = Task::list(&state.db, &filter).await?;

    Ok(Json(tasks))
}

/// Create a task (admin/manager only)
///
/// New tasks start in `todo`; priority defaults to medium.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppJson(req): AppJson<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    auth.require_role(UserRole::Manager)?;
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            priority: req.priority.unwrap_or_default(),
            assigned_to: req.assigned_to,
            project_id: req.project_id,
            created_by: auth.user_id,
        },
    )
    .await?;

    Ok(Json(task))
}

/// Update a task
///
/// Admin/manager may update any task and any field. A worker may only
/// update a task currently assigned to themselves, and may not change
/// the assignee. Status changes go through explicit transitions that set
/// the paired timestamps in the same statement.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    auth.require_owner_or_role(task.assigned_to, UserRole::Manager)
        .map_err(|_| ApiError::Forbidden("Workers can only update their own tasks".to_string()))?;

    // Owners below manager cannot hand the task to someone else
    if !auth.role.is_at_least(UserRole::Manager)
        && req.assigned_to.is_some()
        && req.assigned_to != task.assigned_to
    {
        return Err(ApiError::Forbidden(
            "Workers cannot reassign tasks".to_string(),
        ));
    }

    let update = UpdateTask {
        title: req.title,
        description: req.description,
        priority: req.priority,
        assigned_to: req.assigned_to,
        project_id: req.project_id,
    };

    let mut current = task;

    if !update.is_empty() {
        current = Task::update(&state.db, id, update)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    }

    if let Some(status) = req.status {
        current = Task::apply_status(&state.db, id, status)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    }

    Ok(Json(current))
}

/// Delete a task (admin/manager only)
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    auth.require_role(UserRole::Manager)?;

    let deleted = Task::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(DeletedResponse { deleted }))
}
