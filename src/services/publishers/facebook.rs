use async_trait::async_trait;
use reqwest::Client;

use super::{build_caption, expect_id, PostPublisher, PublishError, PublishedRef, PublisherAccount};
use crate::models::{post::MarketingPost, social::Platform};

/// Facebook Pages publisher. Single call: `/photos` when the post carries
/// an image, `/feed` for a text-only post. Uses a page access token.
pub struct FacebookPublisher {
    client: Client,
    base_url: String,
}

impl FacebookPublisher {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl PostPublisher for FacebookPublisher {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn publish(
        &self,
        account: &PublisherAccount,
        post: &MarketingPost,
    ) -> Result<PublishedRef, PublishError> {
        let message = build_caption(&post.content, &post.hashtags);

        let response = match post.media_urls.first() {
            Some(image_url) => {
                self.client
                    .post(format!("{}/{}/photos", self.base_url, account.business_id))
                    .form(&[
                        ("url", image_url.as_str()),
                        ("message", message.as_str()),
                        ("access_token", account.access_token.as_str()),
                    ])
                    .send()
                    .await?
            }
            None => {
                self.client
                    .post(format!("{}/{}/feed", self.base_url, account.business_id))
                    .form(&[
                        ("message", message.as_str()),
                        ("access_token", account.access_token.as_str()),
                    ])
                    .send()
                    .await?
            }
        };

        let post_id = expect_id(response, Platform::Facebook).await?;
        let url = Some(format!("https://www.facebook.com/{post_id}"));

        Ok(PublishedRef { post_id, url })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::post;
    use super::*;
    use mockito::Matcher;

    fn account() -> PublisherAccount {
        PublisherAccount {
            business_id: "104000000000000".into(),
            access_token: "EAAPagetoken".into(),
        }
    }

    #[tokio::test]
    async fn text_only_post_goes_to_feed() {
        let mut server = mockito::Server::new_async().await;
        let feed = server
            .mock("POST", "/104000000000000/feed")
            .match_body(Matcher::Regex("message=".into()))
            .with_status(200)
            .with_body(r#"{"id":"104_555"}"#)
            .create_async()
            .await;
        let photos = server
            .mock("POST", "/104000000000000/photos")
            .expect(0)
            .create_async()
            .await;

        let publisher = FacebookPublisher::new(Client::new(), server.url());
        let published = publisher
            .publish(&account(), &post(Platform::Facebook, vec![]))
            .await
            .unwrap();

        assert_eq!(published.post_id, "104_555");
        assert_eq!(
            published.url.as_deref(),
            Some("https://www.facebook.com/104_555")
        );
        feed.assert_async().await;
        photos.assert_async().await;
    }

    #[tokio::test]
    async fn post_with_image_goes_to_photos() {
        let mut server = mockito::Server::new_async().await;
        let photos = server
            .mock("POST", "/104000000000000/photos")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("url=".into()),
                Matcher::Regex("message=".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"id":"104_777"}"#)
            .create_async()
            .await;
        let feed = server
            .mock("POST", "/104000000000000/feed")
            .expect(0)
            .create_async()
            .await;

        let publisher = FacebookPublisher::new(Client::new(), server.url());
        let published = publisher
            .publish(
                &account(),
                &post(
                    Platform::Facebook,
                    vec!["https://cdn.example.com/foto.jpg".into()],
                ),
            )
            .await
            .unwrap();

        assert_eq!(published.post_id, "104_777");
        photos.assert_async().await;
        feed.assert_async().await;
    }

    #[tokio::test]
    async fn api_error_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/104000000000000/feed")
            .with_status(403)
            .with_body(r#"{"error":{"message":"(#200) Permissions error"}}"#)
            .create_async()
            .await;

        let publisher = FacebookPublisher::new(Client::new(), server.url());
        let err = publisher
            .publish(&account(), &post(Platform::Facebook, vec![]))
            .await
            .unwrap_err();

        match err {
            PublishError::Api { status, body, .. } => {
                assert_eq!(status, 403);
                assert!(body.contains("Permissions error"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
