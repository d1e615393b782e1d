use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Platforms a post can target. Stored as lowercase TEXT.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    Tiktok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Tiktok => "tiktok",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            "tiktok" => Ok(Platform::Tiktok),
            other => Err(anyhow::anyhow!("Plataforma desconocida: {other}")),
        }
    }
}

/// A connected social account. Tokens are sealed with the per-organization
/// key and only decrypted at point of use.
/// Invariant (enforced by a partial unique index): at most one active row
/// per (organization, platform).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SocialAccount {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub platform: Platform,
    pub account_name: String,
    pub business_id: String,
    #[serde(skip_serializing)]
    pub access_token_enc: String,
    #[serde(skip_serializing)]
    pub refresh_token_enc: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An inbound comment synced from a platform. The reply step only touches
/// rows with `needs_reply AND NOT replied AND NOT is_spam`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SocialComment {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub platform: Platform,
    pub external_comment_id: String,
    pub author_name: String,
    pub text: String,
    pub needs_reply: bool,
    pub replied: bool,
    pub reply_text: Option<String>,
    pub is_spam: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn platform_round_trips_through_str() {
        for p in [Platform::Instagram, Platform::Facebook, Platform::Tiktok] {
            assert_eq!(Platform::from_str(p.as_str()).unwrap(), p);
        }
        assert!(Platform::from_str("myspace").is_err());
    }
}
