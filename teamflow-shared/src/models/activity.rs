/// Activity ledger model and aggregate statistics
///
/// The ledger is append-only: rows are inserted by the periodic client
/// flush and never updated. Two event kinds exist, distinguished by a
/// tagged payload. Duplicate flushes are deduplicated through an optional
/// client-supplied event id, so at-least-once delivery does not inflate
/// the counters.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE activity_kind AS ENUM ('user-activity', 'window-switch');
///
/// CREATE TABLE activity_logs (
///     id BIGSERIAL PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     kind activity_kind NOT NULL,
///     recorded_at TIMESTAMPTZ NOT NULL,
///     payload JSONB NOT NULL,
///     client_event_id UUID UNIQUE
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// The two recognized event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_kind", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    /// Interaction counters accumulated between flushes
    UserActivity,

    /// Window/tab focus change, optionally flagged as an AI tool
    WindowSwitch,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::UserActivity => "user-activity",
            ActivityKind::WindowSwitch => "window-switch",
        }
    }
}

/// Tagged event payload
///
/// The `type` tag matches the wire format; deserialization rejects a
/// payload whose required fields are missing for its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActivityPayload {
    /// Interaction counters
    UserActivity {
        #[serde(rename = "mouseClicks")]
        mouse_clicks: i64,

        #[serde(rename = "keyPresses")]
        key_presses: i64,

        #[serde(rename = "mouseMovements")]
        mouse_movements: i64,
    },

    /// Focus switch
    WindowSwitch {
        title: String,

        url: String,

        #[serde(rename = "isAiTool")]
        is_ai_tool: bool,
    },
}

impl ActivityPayload {
    /// The kind this payload belongs to
    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityPayload::UserActivity { .. } => ActivityKind::UserActivity,
            ActivityPayload::WindowSwitch { .. } => ActivityKind::WindowSwitch,
        }
    }

    /// Sum of the three interaction counters (zero for window switches)
    pub fn interaction_total(&self) -> i64 {
        match self {
            ActivityPayload::UserActivity {
                mouse_clicks,
                key_presses,
                mouse_movements,
            } => mouse_clicks + key_presses + mouse_movements,
            ActivityPayload::WindowSwitch { .. } => 0,
        }
    }

    /// Whether this is a window switch flagged as an AI tool
    pub fn is_ai_detection(&self) -> bool {
        matches!(
            self,
            ActivityPayload::WindowSwitch {
                is_ai_tool: true,
                ..
            }
        )
    }
}

/// One immutable ledger row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    /// Row id
    pub id: i64,

    /// User the event belongs to
    pub user_id: Uuid,

    /// Event kind, always consistent with the payload tag
    pub kind: ActivityKind,

    /// When the event happened (client clock)
    pub recorded_at: DateTime<Utc>,

    /// Kind-specific payload
    pub payload: Json<ActivityPayload>,

    /// Client-supplied id for idempotent ingestion
    pub client_event_id: Option<Uuid>,
}

/// Input for appending one ledger row
#[derive(Debug, Clone)]
pub struct RecordActivity {
    pub user_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub payload: ActivityPayload,
    pub client_event_id: Option<Uuid>,
}

/// Summed interaction counters over an interval
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub mouse_clicks: i64,
    pub key_presses: i64,
    pub mouse_movements: i64,
}

impl AggregateStats {
    /// Total interaction count across the three counters
    pub fn total(&self) -> i64 {
        self.mouse_clicks + self.key_presses + self.mouse_movements
    }
}

/// Per-user counter sums, labeled with the user's email
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PerUserStats {
    pub email: String,
    pub mouse_clicks: i64,
    pub key_presses: i64,
    pub mouse_movements: i64,
}

/// Computes the average interaction count per hour over a closed interval
///
/// Rounded to the nearest integer; a degenerate interval yields zero.
pub fn average_per_hour(total: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    let hours = seconds as f64 / 3600.0;
    (total as f64 / hours).round() as i64
}

const ACTIVITY_COLUMNS: &str = "id, user_id, kind, recorded_at, payload, client_event_id";

impl ActivityLog {
    /// Appends one row to the ledger
    ///
    /// A duplicate `client_event_id` is silently skipped.
    ///
    /// # Returns
    ///
    /// True when a row was inserted, false when deduplicated
    pub async fn append(pool: &PgPool, data: RecordActivity) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO activity_logs (user_id, kind, recorded_at, payload, client_event_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (client_event_id) DO NOTHING
            "#,
        )
        .bind(data.user_id)
        .bind(data.payload.kind())
        .bind(data.recorded_at)
        .bind(Json(&data.payload))
        .bind(data.client_event_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches all rows in a closed interval, oldest first
    ///
    /// Both event kinds are returned; `user_id` optionally narrows the
    /// scope to one user.
    pub async fn list_range(
        pool: &PgPool,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        user_id: Option<Uuid>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activity_logs \
             WHERE recorded_at >= $1 AND recorded_at <= $2",
        );
        if user_id.is_some() {
            query.push_str(" AND user_id = $3");
        }
        query.push_str(" ORDER BY recorded_at ASC, id ASC");

        let mut q = sqlx::query_as::<_, ActivityLog>(&query).bind(start).bind(end);
        if let Some(user_id) = user_id {
            q = q.bind(user_id);
        }

        let rows = q.fetch_all(pool).await?;

        Ok(rows)
    }

    /// Sums the interaction counters over a closed interval
    ///
    /// Only `user-activity` rows contribute. An interval with no matching
    /// rows yields all-zero sums, not an error.
    pub async fn aggregate_stats(
        pool: &PgPool,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        user_id: Option<Uuid>,
    ) -> Result<AggregateStats, sqlx::Error> {
        let mut query = String::from(
            "SELECT \
               COALESCE(SUM((payload->>'mouseClicks')::BIGINT), 0)::BIGINT AS mouse_clicks, \
               COALESCE(SUM((payload->>'keyPresses')::BIGINT), 0)::BIGINT AS key_presses, \
               COALESCE(SUM((payload->>'mouseMovements')::BIGINT), 0)::BIGINT AS mouse_movements \
             FROM activity_logs \
             WHERE kind = 'user-activity' AND recorded_at >= $1 AND recorded_at <= $2",
        );
        if user_id.is_some() {
            query.push_str(" AND user_id = $3");
        }

        let mut q = sqlx::query_as::<_, AggregateStats>(&query).bind(start).bind(end);
        if let Some(user_id) = user_id {
            q = q.bind(user_id);
        }

        let stats = q.fetch_one(pool).await?;

        Ok(stats)
    }

    /// Sums the interaction counters per user over a closed interval
    ///
    /// Grouped by user, labeled with the user's email, ordered by email.
    pub async fn per_user_stats(
        pool: &PgPool,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PerUserStats>, sqlx::Error> {
        let stats = sqlx::query_as::<_, PerUserStats>(
            r#"
            SELECT u.email,
                   COALESCE(SUM((l.payload->>'mouseClicks')::BIGINT), 0)::BIGINT AS mouse_clicks,
                   COALESCE(SUM((l.payload->>'keyPresses')::BIGINT), 0)::BIGINT AS key_presses,
                   COALESCE(SUM((l.payload->>'mouseMovements')::BIGINT), 0)::BIGINT AS mouse_movements
            FROM activity_logs l
            JOIN users u ON u.id = l.user_id
            WHERE l.kind = 'user-activity'
              AND l.recorded_at >= $1 AND l.recorded_at <= $2
            GROUP BY u.email
            ORDER BY u.email ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(stats)
    }
}
