use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{PostPublisher, PublishError, PublishedRef, PublisherAccount};
use crate::models::{post::MarketingPost, social::Platform};

/// TikTok content-posting publisher. Initiates a pull-from-URL video
/// upload; completion is asynchronous on TikTok's side, so the returned
/// reference is the pending publish id, not a final post id or URL.
pub struct TikTokPublisher {
    client: Client,
    base_url: String,
}

impl TikTokPublisher {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl PostPublisher for TikTokPublisher {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    async fn publish(
        &self,
        account: &PublisherAccount,
        post: &MarketingPost,
    ) -> Result<PublishedRef, PublishError> {
        let video_url = post
            .media_urls
            .iter()
            .find(|u| u.ends_with(".mp4") || u.ends_with(".mov") || u.contains("video"))
            .ok_or(PublishError::MissingVideo)?;

        let response = self
            .client
            .post(format!(
                "{}/post/publish/inbox/video/init/",
                self.base_url
            ))
            .bearer_auth(&account.access_token)
            .json(&json!({
                "source_info": {
                    "source": "PULL_FROM_URL",
                    "video_url": video_url,
                }
            }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(PublishError::Api {
                platform: Platform::Tiktok,
                status: status.as_u16(),
                body: text,
            });
        }

        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        let publish_id = body["data"]["publish_id"]
            .as_str()
            .ok_or(PublishError::MissingId(Platform::Tiktok))?;

        Ok(PublishedRef {
            post_id: publish_id.to_string(),
            url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::post;
    use super::*;

    fn account() -> PublisherAccount {
        PublisherAccount {
            business_id: "tt-open-id".into(),
            access_token: "act.tiktok".into(),
        }
    }

    #[tokio::test]
    async fn publish_without_video_fails() {
        let publisher =
            TikTokPublisher::new(Client::new(), "http://127.0.0.1:1/unreachable".into());
        let err = publisher
            .publish(
                &account(),
                &post(Platform::Tiktok, vec!["https://cdn.example.com/foto.jpg".into()]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "TikTok requiere un video");
    }

    #[tokio::test]
    async fn publish_returns_pending_publish_id() {
        let mut server = mockito::Server::new_async().await;
        let init = server
            .mock("POST", "/post/publish/inbox/video/init/")
            .match_header("authorization", "Bearer act.tiktok")
            .with_status(200)
            .with_body(r#"{"data":{"publish_id":"v_pub_123"},"error":{"code":"ok"}}"#)
            .create_async()
            .await;

        let publisher = TikTokPublisher::new(Client::new(), server.url());
        let published = publisher
            .publish(
                &account(),
                &post(Platform::Tiktok, vec!["https://cdn.example.com/clip.mp4".into()]),
            )
            .await
            .unwrap();

        assert_eq!(published.post_id, "v_pub_123");
        assert_eq!(published.url, None);
        init.assert_async().await;
    }
}
