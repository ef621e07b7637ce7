/// Task model and database operations
///
/// Tasks are the unit of work on the kanban board. Status changes are
/// explicit transitions that atomically set the paired timestamp fields,
/// so a task can never carry a `done` status without an end timestamp the
/// transition produced.
///
/// # State Machine
///
/// ```text
/// todo → inprogress   (sets started_at)
/// inprogress → done   (sets ended_at and time_spent = ended - started)
/// any  → frozen       (explicit pause/terminal marker)
/// ```
///
/// Managers and admins may also move a task to any status directly; the
/// transition still applies its paired timestamps.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'inprogress', 'done', 'frozen');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     project_id UUID REFERENCES projects(id) ON DELETE SET NULL,
///     started_at TIMESTAMPTZ,
///     ended_at TIMESTAMPTZ,
///     time_spent_seconds BIGINT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on; entering this state records started_at
    InProgress,

    /// Finished; entering this state records ended_at and time spent
    Done,

    /// Explicitly paused/parked
    Frozen,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "inprogress",
            TaskStatus::Done => "done",
            TaskStatus::Frozen => "frozen",
        }
    }

    /// Whether entering this status records a start timestamp
    pub fn records_start(&self) -> bool {
        matches!(self, TaskStatus::InProgress)
    }

    /// Whether entering this status records an end timestamp and duration
    pub fn records_end(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Current lifecycle status
    pub status: TaskStatus,

    /// Priority, defaults to medium
    pub priority: TaskPriority,

    /// Assignee (nullable)
    pub assigned_to: Option<Uuid>,

    /// Creator (nullable only if the creator account was deleted)
    pub created_by: Option<Uuid>,

    /// Project association (nullable)
    pub project_id: Option<Uuid>,

    /// Set when the task entered `inprogress`
    pub started_at: Option<DateTime<Utc>>,

    /// Set when the task entered `done`
    pub ended_at: Option<DateTime<Utc>>,

    /// Derived duration in seconds, set together with `ended_at`
    pub time_spent_seconds: Option<i64>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// A task joined with display names for the board
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithNames {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,

    /// Assignee display name, if assigned
    pub assignee_name: Option<String>,

    /// Creator display name
    pub creator_name: Option<String>,

    /// Project name, if associated
    pub project_name: Option<String>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub assigned_to: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub created_by: Uuid,
}

/// Input for updating a task's plain fields
///
/// Status is deliberately absent here; status changes go through
/// [`Task::apply_status`] so the paired timestamps cannot be skipped.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

impl UpdateTask {
    /// Whether the update carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.assigned_to.is_none()
            && self.project_id.is_none()
    }
}

/// Structured task list filter
///
/// Composed into parameterized SQL; filter values never appear in the
/// query text.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

impl TaskFilter {
    /// Renders the WHERE fragment, numbering binds from `start_bind`
    ///
    /// Returns the fragment (possibly empty) and the number of binds it
    /// expects, in field order: status, assigned_to, project_id.
    pub fn where_clause(&self, start_bind: usize) -> (String, usize) {
        let mut clauses = Vec::new();
        let mut bind = start_bind;

        if self.status.is_some() {
            clauses.push(format!("t.status = ${}", bind));
            bind += 1;
        }
        if self.assigned_to.is_some() {
            clauses.push(format!("t.assigned_to = ${}", bind));
            bind += 1;
        }
        if self.project_id.is_some() {
            clauses.push(format!("t.project_id = ${}", bind));
            bind += 1;
        }

        if clauses.is_empty() {
            (String::new(), 0)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), bind - start_bind)
        }
    }
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, assigned_to, created_by, \
     project_id, started_at, ended_at, time_spent_seconds, created_at, updated_at";

const TASK_COLUMNS_QUALIFIED: &str =
    "t.id, t.title, t.description, t.status, t.priority, t.assigned_to, t.created_by, \
     t.project_id, t.started_at, t.ended_at, t.time_spent_seconds, t.created_at, t.updated_at";

impl Task {
    /// Creates a new task in `todo` status
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, description, priority, assigned_to, project_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.description.unwrap_or_default())
        .bind(data.priority)
        .bind(data.assigned_to)
        .bind(data.project_id)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks matching a filter, newest-created-first, joined with
    /// assignee/creator/project display names
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<TaskWithNames>, sqlx::Error> {
        let (where_clause, _) = filter.where_clause(1);

        let query = format!(
            r#"
            SELECT {TASK_COLUMNS_QUALIFIED},
                   au.name AS assignee_name,
                   cu.name AS creator_name,
                   p.name AS project_name
            FROM tasks t
            LEFT JOIN users au ON au.id = t.assigned_to
            LEFT JOIN users cu ON cu.id = t.created_by
            LEFT JOIN projects p ON p.id = t.project_id
            {where_clause}
            ORDER BY t.created_at DESC
            "#,
        );

        let mut q = sqlx::query_as::<_, TaskWithNames>(&query);

        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(assigned_to) = filter.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(project_id) = filter.project_id {
            q = q.bind(project_id);
        }

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Updates a task's plain fields with partial-merge semantics
    ///
    /// Only `Some` fields are written; `updated_at` is always refreshed.
    /// Returns None when the id is unknown.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }
        if data.project_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", project_id = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(project_id) = data.project_id {
            q = q.bind(project_id);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Applies a status transition, setting the paired timestamps atomically
    ///
    /// - `inprogress` records `started_at`
    /// - `done` records `ended_at` and derives `time_spent_seconds` from
    ///   `started_at` in the same statement
    /// - `todo`/`frozen` change only the status
    ///
    /// Returns None when the id is unknown.
    pub async fn apply_status(
        pool: &PgPool,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = match status {
            TaskStatus::InProgress => {
                sqlx::query_as::<_, Task>(&format!(
                    r#"
                    UPDATE tasks
                    SET status = 'inprogress',
                        started_at = NOW(),
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING {TASK_COLUMNS}
                    "#,
                ))
                .bind(id)
                .fetch_optional(pool)
                .await?
            }
            TaskStatus::Done => {
                // time_spent falls back to zero when the task never went
                // through inprogress (started_at missing).
                sqlx::query_as::<_, Task>(&format!(
                    r#"
                    UPDATE tasks
                    SET status = 'done',
                        ended_at = NOW(),
                        time_spent_seconds =
                            EXTRACT(EPOCH FROM (NOW() - COALESCE(started_at, NOW())))::BIGINT,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING {TASK_COLUMNS}
                    "#,
                ))
                .bind(id)
                .fetch_optional(pool)
                .await?
            }
            TaskStatus::Todo | TaskStatus::Frozen => {
                sqlx::query_as::<_, Task>(&format!(
                    r#"
                    UPDATE tasks
                    SET status = $2,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING {TASK_COLUMNS}
                    "#,
                ))
                .bind(id)
                .bind(status)
                .fetch_optional(pool)
                .await?
            }
        };

        Ok(task)
    }

    /// Deletes a task permanently
    ///
    /// # Returns
    ///
    /// True if the task existed and was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
