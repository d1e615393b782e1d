use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tenant. Owns every other row in the system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Brand settings used to build generation prompts.
/// Content generation only runs once `is_complete` is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BusinessProfile {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub brand_voice: String,
    pub tone: String,
    pub target_audience: String,
    pub hashtags: Vec<String>,
    pub products: Vec<String>,
    pub is_complete: bool,
    pub updated_at: DateTime<Utc>,
}

/// Per-organization automation switch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarketingConfig {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub is_paused: bool,
    pub updated_at: DateTime<Utc>,
}
