use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::AppState;

/// Extractor that validates the `Authorization: Bearer <CRON_SECRET>`
/// header sent by the infrastructure scheduler. This is the only access
/// control on the cron routes; the caller is a scheduler, not a user.
pub struct CronAuth;

impl FromRequestParts<AppState> for CronAuth {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or((StatusCode::UNAUTHORIZED, "Invalid Authorization header format"))?;

        if token != state.config.cron_secret {
            return Err((StatusCode::UNAUTHORIZED, "Invalid cron secret"));
        }

        Ok(CronAuth)
    }
}
