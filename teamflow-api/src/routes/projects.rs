/// Project registry endpoints
///
/// # Endpoints
///
/// - `GET /projects` - List projects with creator names
/// - `GET /projects/with-summary` - List projects with task aggregates
/// - `POST /projects` - Create a project (admin/manager)
/// - `PUT /projects/:id` - Update a project (admin/manager)
/// - `DELETE /projects/:id` - Delete a project (admin/manager)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use teamflow_shared::{
    auth::context::AuthContext,
    models::{
        project::{
            CreateProject, Project, ProjectSummary, ProjectWithCreator, UpdateProject,
        },
        user::UserRole,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[serde(rename = "startDate")]
    pub start_date: Option<NaiveDate>,

    pub deadline: Option<NaiveDate>,
}

/// Update project request; omitted fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[serde(rename = "startDate")]
    pub start_date: Option<NaiveDate>,

    pub deadline: Option<NaiveDate>,

    pub status: Option<String>,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// List all projects, newest first, with creator display names
pub async fn list_projects(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProjectWithCreator>>> {
    let projects = Project::list(&state.db).await?;

    Ok(Json(projects))
}

/// List all projects with task aggregates
///
/// Each entry carries total/completed task counts and the on-track flag
/// (at least one task and at least half of them done). The aggregates
/// come from a single grouped query, not one query per project.
pub async fn list_projects_with_summary(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    let summaries = Project::list_with_summary(&state.db).await?;

    Ok(Json(summaries))
}

/// Create a project (admin/manager only)
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppJson(req): AppJson<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    auth.require_role(UserRole::Manager)?;
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            start_date: req.start_date,
            deadline: req.deadline,
            created_by: auth.user_id,
        },
    )
    .await?;

    Ok(Json(project))
}

/// Update a project with partial-merge semantics (admin/manager only)
///
/// An unknown id is an explicit 404, never a silent no-op.
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    auth.require_role(UserRole::Manager)?;
    req.validate()?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
            start_date: req.start_date,
            deadline: req.deadline,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Delete a project (admin/manager only)
///
/// Associated tasks are kept and orphaned (their project reference is
/// cleared), matching the schema's ON DELETE SET NULL.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    auth.require_role(UserRole::Manager)?;

    let deleted = Project::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    Ok(Json(DeletedResponse { deleted }))
}
