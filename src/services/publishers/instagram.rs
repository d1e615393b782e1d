use async_trait::async_trait;
use reqwest::Client;

use super::{build_caption, expect_id, PostPublisher, PublishError, PublishedRef, PublisherAccount};
use crate::models::{post::MarketingPost, social::Platform};

/// Instagram Graph API publisher. Two-phase: create a media container,
/// then publish it with the returned creation id.
pub struct InstagramPublisher {
    client: Client,
    base_url: String,
}

impl InstagramPublisher {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl PostPublisher for InstagramPublisher {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn publish(
        &self,
        account: &PublisherAccount,
        post: &MarketingPost,
    ) -> Result<PublishedRef, PublishError> {
        let image_url = post
            .media_urls
            .first()
            .ok_or(PublishError::MissingImage)?;
        let caption = build_caption(&post.content, &post.hashtags);

        // Phase 1: media container
        let response = self
            .client
            .post(format!("{}/{}/media", self.base_url, account.business_id))
            .form(&[
                ("image_url", image_url.as_str()),
                ("caption", caption.as_str()),
                ("access_token", account.access_token.as_str()),
            ])
            .send()
            .await?;
        let creation_id = expect_id(response, Platform::Instagram).await?;

        // Phase 2: publish the container
        let response = self
            .client
            .post(format!(
                "{}/{}/media_publish",
                self.base_url, account.business_id
            ))
            .form(&[
                ("creation_id", creation_id.as_str()),
                ("access_token", account.access_token.as_str()),
            ])
            .send()
            .await?;
        let post_id = expect_id(response, Platform::Instagram).await?;

        Ok(PublishedRef {
            post_id,
            url: None,
        })
    }
}
