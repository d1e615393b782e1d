use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// SEO scan target and cached result. Re-scanned at most once per 24h.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeoConfig {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub target_url: Option<String>,
    pub last_scanned_at: Option<DateTime<Utc>>,
    pub last_score: Option<i16>,
}

impl SeoConfig {
    /// A scan is due when a target URL exists and the last scan is absent
    /// or older than 24 hours.
    pub fn scan_due(&self, now: DateTime<Utc>) -> bool {
        if self.target_url.as_deref().map_or(true, |u| u.is_empty()) {
            return false;
        }
        match self.last_scanned_at {
            None => true,
            Some(t) => now - t >= chrono::Duration::hours(24),
        }
    }
}
