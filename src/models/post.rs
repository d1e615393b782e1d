use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::social::Platform;

/// Post lifecycle. Stored as lowercase TEXT.
///
/// scheduled → publishing → published | failed
///
/// A post only reaches `published` after an adapter call returned an
/// external post id; any adapter error lands it in `failed` with the
/// message in `publish_error`. `failed` is terminal: the due-post query
/// selects `scheduled` rows only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Scheduled,
    Publishing,
    Published,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Scheduled => "scheduled",
            PostStatus::Publishing => "publishing",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }
}

/// Content types rotated by the generation step.
pub const CONTENT_TYPES: &[&str] = &[
    "promotional",
    "educational",
    "engagement",
    "behind_the_scenes",
];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarketingPost {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub platform: Platform,
    pub status: PostStatus,
    pub content: String,
    pub hashtags: Vec<String>,
    pub media_urls: Vec<String>,
    pub content_type: String,
    pub scheduled_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub external_id: Option<String>,
    pub external_url: Option<String>,
    pub publish_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
