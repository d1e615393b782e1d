use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Terminal state of an engine run. Stored as lowercase TEXT.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// One row per orchestrator invocation. Append-only; `results` holds a
/// JSON-encoded summary string.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CronLog {
    pub id: Uuid,
    pub job_name: String,
    pub status: RunStatus,
    pub results: Option<String>,
    pub error: Option<String>,
    pub duration_ms: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
