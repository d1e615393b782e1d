use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::middleware::cron::CronAuth;
use crate::models::cron_log::RunStatus;
use crate::services::cron_log::CronLogService;
use crate::services::engine::RunReport;
use crate::AppState;

/// GET /api/cron/marketing-engine — the full pass: content generation,
/// publishing, SEO and comment replies for every eligible organization.
pub async fn marketing_engine(
    State(state): State<AppState>,
    _auth: CronAuth,
) -> (StatusCode, Json<Value>) {
    respond(state.engine.run().await)
}

/// GET /api/cron/publish-scheduled — publish due posts only, capped at 50
/// per pass.
pub async fn publish_scheduled(
    State(state): State<AppState>,
    _auth: CronAuth,
) -> (StatusCode, Json<Value>) {
    respond(state.engine.run_publish_pass().await)
}

/// GET /api/cron/social-publish — token refresh and comment replies.
pub async fn social_publish(
    State(state): State<AppState>,
    _auth: CronAuth,
) -> (StatusCode, Json<Value>) {
    respond(state.engine.run_social_pass().await)
}

/// GET /api/cron/runs — last 50 ledger rows, newest first.
pub async fn list_runs(
    State(state): State<AppState>,
    _auth: CronAuth,
) -> (StatusCode, Json<Value>) {
    match CronLogService::recent(&state.db, 50).await {
        Ok(runs) => (StatusCode::OK, Json(json!({ "runs": runs }))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

fn respond(report: anyhow::Result<RunReport>) -> (StatusCode, Json<Value>) {
    match report {
        Ok(report) if report.status == RunStatus::Completed => (
            StatusCode::OK,
            Json(json!({ "success": true, "results": report.result })),
        ),
        Ok(report) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": report.error,
                "results": report.result,
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": e.to_string() })),
        ),
    }
}
