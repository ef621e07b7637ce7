/// Project model and database operations
///
/// Projects group tasks and carry a derived health flag: a project is
/// **on-track** when it has at least one task and at least half of its
/// tasks are done. A project with zero tasks is never on-track.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     start_date DATE,
///     deadline DATE,
///     status VARCHAR(50) NOT NULL DEFAULT 'planning',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name, required and non-empty
    pub name: String,

    /// Rich-text description, stored as-is
    pub description: String,

    /// Creator (nullable only if the creator account was deleted)
    pub created_by: Option<Uuid>,

    /// Optional start date
    pub start_date: Option<NaiveDate>,

    /// Optional deadline
    pub deadline: Option<NaiveDate>,

    /// Free-form status, defaults to "planning"
    pub status: String,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// A project joined with the creator's display name
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithCreator {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,

    /// Creator display name
    pub creator_name: Option<String>,
}

/// A project plus its task completion summary
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,

    /// Creator display name
    pub creator_name: Option<String>,

    /// Number of tasks associated with the project
    pub total_tasks: i64,

    /// Number of those tasks in `done` status
    pub completed_tasks: i64,

    /// Derived health flag, filled in from the two counts after the fetch
    #[sqlx(default)]
    pub on_track: bool,
}

/// Computes the on-track rule: ≥1 task and ≥50% of tasks done
///
/// The boundary is inclusive: exactly half done counts as on-track.
pub fn on_track(total_tasks: i64, completed_tasks: i64) -> bool {
    total_tasks > 0 && completed_tasks * 2 >= total_tasks
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub created_by: Uuid,
}

/// Input for updating an existing project
///
/// Only `Some` fields are written; everything else keeps its prior value.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub status: Option<String>,
}

const PROJECT_COLUMNS: &str =
    "id, name, description, created_by, start_date, deadline, status, created_at, updated_at";

const PROJECT_COLUMNS_QUALIFIED: &str =
    "p.id, p.name, p.description, p.created_by, p.start_date, p.deadline, p.status, \
     p.created_at, p.updated_at";

impl Project {
    /// Creates a new project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (name, description, start_date, deadline, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.description.unwrap_or_default())
        .bind(data.start_date)
        .bind(data.deadline)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects with creator display names, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<ProjectWithCreator>, sqlx::Error> {
        let projects = sqlx::query_as::<_, ProjectWithCreator>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS_QUALIFIED}, u.name AS creator_name
            FROM projects p
            LEFT JOIN users u ON u.id = p.created_by
            ORDER BY p.created_at DESC
            "#,
        ))
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Lists all projects with their task completion summary
    ///
    /// One aggregate pass over the tasks table; the on-track flag is
    /// derived from the two counts via [`on_track`].
    pub async fn list_with_summary(pool: &PgPool) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        let summaries = sqlx::query_as::<_, ProjectSummary>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS_QUALIFIED},
                   u.name AS creator_name,
                   COUNT(t.id) AS total_tasks,
                   COUNT(t.id) FILTER (WHERE t.status = 'done') AS completed_tasks
            FROM projects p
            LEFT JOIN users u ON u.id = p.created_by
            LEFT JOIN tasks t ON t.project_id = p.id
            GROUP BY p.id, u.name
            ORDER BY p.created_at DESC
            "#,
        ))
        .fetch_all(pool)
        .await?;

        let summaries = summaries
            .into_iter()
            .map(|mut summary| {
                summary.on_track = on_track(summary.total_tasks, summary.completed_tasks);
                summary
            })
            .collect();

        Ok(summaries)
    }

    /// Updates a project with partial-merge semantics
    ///
    /// Returns None when the id is unknown; the API layer turns that into
    /// `NotFound` rather than a silent no-op.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.start_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_date = ${}", bind_count));
        }
        if data.deadline.is_some() {
            bind_count += 1;
            query.push_str(&format!(", deadline = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {PROJECT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(start_date) = data.start_date {
            q = q.bind(start_date);
        }
        if let Some(deadline) = data.deadline {
            q = q.bind(deadline);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project permanently
    ///
    /// Associated tasks are orphaned (their project_id set to NULL by the
    /// foreign key), not removed.
    ///
    /// # Returns
    ///
    /// True if the project existed and was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_tasks_is_never_on_track() {
        assert!(!on_track(0, 0));
    }

    #[test]
    fn test_half_done_boundary_is_inclusive() {
        assert!(on_track(2, 1));
        assert!(on_track(4, 2));
        assert!(on_track(10, 5));
    }

    #[test]
    fn test_below_half_is_off_track() {
        assert!(!on_track(3, 1));
        assert!(!on_track(10, 4));
        assert!(!on_track(1, 0));
    }

    #[test]
    fn test_fully_done_is_on_track() {
        assert!(on_track(1, 1));
        assert!(on_track(7, 7));
    }

    #[test]
    fn test_odd_totals_round_against_the_project() {
        // 2 of 5 is below 50%, 3 of 5 is above
        assert!(!on_track(5, 2));
        assert!(on_track(5, 3));
    }

    #[test]
    fn test_update_project_default() {
        let update = UpdateProject::default();
        assert!(update.name.is_none());
        assert!(update.status.is_none());
    }

    #[test]
    fn test_summary_serializes_on_track_flag() {
        let summary = ProjectSummary {
            project: Project {
                id: Uuid::new_v4(),
                name: "Launch".to_string(),
                description: String::new(),
                created_by: None,
                start_date: None,
                deadline: None,
                status: "planning".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            creator_name: Some("Dana".to_string()),
            total_tasks: 2,
            completed_tasks: 1,
            on_track: on_track(2, 1),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["onTrack"], serde_json::Value::Bool(true));
        assert_eq!(json["totalTasks"], 2);
        assert_eq!(json["completedTasks"], 1);
        assert_eq!(json["creatorName"], "Dana");
        // flattened project fields keep the same casing convention
        assert!(json.get("createdAt").is_some());
    }
}
