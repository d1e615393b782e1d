use sqlx::PgPool;
use uuid::Uuid;

use crate::models::cron_log::CronLog;

/// Append-only run ledger. Every `open` during a run is matched by exactly
/// one terminal update (`complete` or `fail`), guaranteed by the single
/// match site in the engine.
pub struct CronLogService;

impl CronLogService {
    pub async fn open(pool: &PgPool, job_name: &str) -> anyhow::Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO cron_logs (job_name, status) VALUES ($1, 'running') RETURNING id",
        )
        .bind(job_name)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    pub async fn complete(
        pool: &PgPool,
        id: Uuid,
        results_json: &str,
        duration_ms: i64,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE cron_logs
             SET status = 'completed', results = $1, duration_ms = $2, finished_at = NOW()
             WHERE id = $3",
        )
        .bind(results_json)
        .bind(duration_ms)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Most recent runs, newest first. Backs the observability route.
    pub async fn recent(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<CronLog>> {
        let rows = sqlx::query_as::<_, CronLog>(
            "SELECT * FROM cron_logs ORDER BY started_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn fail(
        pool: &PgPool,
        id: Uuid,
        error: &str,
        results_json: &str,
        duration_ms: i64,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE cron_logs
             SET status = 'failed', error = $1, results = $2, duration_ms = $3, finished_at = NOW()
             WHERE id = $4",
        )
        .bind(error)
        .bind(results_json)
        .bind(duration_ms)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
