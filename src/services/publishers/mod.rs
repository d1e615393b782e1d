pub mod facebook;
pub mod instagram;
pub mod tiktok;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::models::{post::MarketingPost, social::Platform};

pub use facebook::FacebookPublisher;
pub use instagram::InstagramPublisher;
pub use tiktok::TikTokPublisher;

/// Pinned Graph API version for the Meta adapters.
pub const GRAPH_API_BASE: &str = "https://graph.facebook.com/v21.0";
pub const TIKTOK_API_BASE: &str = "https://open.tiktokapis.com/v2";

/// Decrypted credentials handed to an adapter for a single publish call.
/// `business_id` is the IG business account id, FB page id or TikTok open id.
#[derive(Debug, Clone)]
pub struct PublisherAccount {
    pub business_id: String,
    pub access_token: String,
}

/// Reference to the post as created on the platform. TikTok returns a
/// pending publish id with no URL; Meta platforms return the final id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRef {
    pub post_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Instagram requiere una imagen")]
    MissingImage,
    #[error("TikTok requiere un video")]
    MissingVideo,
    #[error("{platform} API error {status}: {body}")]
    Api {
        platform: Platform,
        status: u16,
        body: String,
    },
    #[error("respuesta de {0} sin id de publicación")]
    MissingId(Platform),
    #[error("error de red: {0}")]
    Http(#[from] reqwest::Error),
}

/// Uniform publish contract. Adapters are pure functions of
/// (credentials, content), with no local state beyond the HTTP client.
#[async_trait]
pub trait PostPublisher: Send + Sync {
    fn platform(&self) -> Platform;

    async fn publish(
        &self,
        account: &PublisherAccount,
        post: &MarketingPost,
    ) -> Result<PublishedRef, PublishError>;
}

/// Dispatch table keyed by platform.
#[derive(Default)]
pub struct PublisherRegistry {
    publishers: HashMap<Platform, Arc<dyn PostPublisher>>,
}

impl PublisherRegistry {
    /// Registry with the three production adapters.
    pub fn standard(client: Client) -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(InstagramPublisher::new(
            client.clone(),
            GRAPH_API_BASE.to_string(),
        )));
        registry.register(Arc::new(FacebookPublisher::new(
            client.clone(),
            GRAPH_API_BASE.to_string(),
        )));
        registry.register(Arc::new(TikTokPublisher::new(
            client,
            TIKTOK_API_BASE.to_string(),
        )));
        registry
    }

    pub fn register(&mut self, publisher: Arc<dyn PostPublisher>) {
        self.publishers.insert(publisher.platform(), publisher);
    }

    pub fn get(&self, platform: Platform) -> Option<&Arc<dyn PostPublisher>> {
        self.publishers.get(&platform)
    }
}

/// Caption sent to Meta platforms: content, blank line, hashtags.
pub fn build_caption(content: &str, hashtags: &[String]) -> String {
    if hashtags.is_empty() {
        content.to_string()
    } else {
        format!("{}\n\n{}", content, hashtags.join(" "))
    }
}

/// Read a Graph-style response: non-2xx becomes `Api`, a 2xx body without
/// an `id` field becomes `MissingId`.
pub(crate) async fn expect_id(
    response: reqwest::Response,
    platform: Platform,
) -> Result<String, PublishError> {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(PublishError::Api {
            platform,
            status: status.as_u16(),
            body: text,
        });
    }

    let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
    body["id"]
        .as_str()
        .map(ToString::to_string)
        .ok_or(PublishError::MissingId(platform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::PostStatus;
    use chrono::Utc;
    use uuid::Uuid;

    pub(crate) fn post(platform: Platform, media_urls: Vec<String>) -> MarketingPost {
        MarketingPost {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            platform,
            status: PostStatus::Scheduled,
            content: "Nueva colección de otoño".into(),
            hashtags: vec!["#moda".into(), "#otoño".into()],
            media_urls,
            content_type: "promotional".into(),
            scheduled_at: Utc::now(),
            published_at: None,
            external_id: None,
            external_url: None,
            publish_error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn caption_joins_content_and_hashtags() {
        let caption = build_caption("Hola", &["#a".into(), "#b".into()]);
        assert_eq!(caption, "Hola\n\n#a #b");
    }

    #[test]
    fn caption_without_hashtags_is_bare_content() {
        assert_eq!(build_caption("Hola", &[]), "Hola");
    }

    #[test]
    fn registry_dispatches_by_platform() {
        let registry = PublisherRegistry::standard(Client::new());
        for p in [Platform::Instagram, Platform::Facebook, Platform::Tiktok] {
            assert_eq!(registry.get(p).unwrap().platform(), p);
        }
    }

    #[test]
    fn missing_image_error_message_is_stable() {
        // The dashboard surfaces this literal as publish_error.
        assert_eq!(
            PublishError::MissingImage.to_string(),
            "Instagram requiere una imagen"
        );
        assert_eq!(
            PublishError::MissingVideo.to_string(),
            "TikTok requiere un video"
        );
    }
}
