use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::organization::BusinessProfile;
use crate::models::social::{Platform, SocialAccount, SocialComment};
use crate::services::encryption::open_token;
use crate::services::generator::ContentGenerator;

/// Per-organization cap on replies per pass.
const MAX_REPLIES_PER_PASS: i64 = 10;

pub struct CommentService;

impl CommentService {
    /// Generate and post replies for pending comments of one organization.
    /// Pending = `needs_reply AND NOT replied AND NOT is_spam`. Per-comment
    /// failures are logged and skipped. Returns the number replied.
    pub async fn reply_pending(
        pool: &PgPool,
        http: &Client,
        graph_base: &str,
        generator: &Arc<dyn ContentGenerator>,
        profile: &BusinessProfile,
        accounts: &[SocialAccount],
        org_key: &[u8; 32],
        organization_id: Uuid,
    ) -> anyhow::Result<usize> {
        let pending: Vec<SocialComment> = sqlx::query_as(
            "SELECT * FROM social_comments
             WHERE organization_id = $1
               AND needs_reply = TRUE AND replied = FALSE AND is_spam = FALSE
             ORDER BY created_at ASC
             LIMIT $2",
        )
        .bind(organization_id)
        .bind(MAX_REPLIES_PER_PASS)
        .fetch_all(pool)
        .await?;

        if pending.is_empty() {
            return Ok(0);
        }

        let by_platform: HashMap<Platform, &SocialAccount> = accounts
            .iter()
            .filter(|a| a.is_active)
            .map(|a| (a.platform, a))
            .collect();

        let mut replied = 0usize;

        for comment in pending {
            // TikTok comment replies go through a separate flow not wired
            // into the engine.
            if comment.platform == Platform::Tiktok {
                debug!(comment = %comment.id, "Comentario de TikTok omitido");
                continue;
            }

            let Some(account) = by_platform.get(&comment.platform) else {
                debug!(
                    comment = %comment.id,
                    platform = %comment.platform,
                    "Sin cuenta activa para responder"
                );
                continue;
            };

            let token = match open_token(&account.access_token_enc, org_key) {
                Ok(t) => t,
                Err(e) => {
                    warn!(comment = %comment.id, "No se pudo descifrar el token: {e}");
                    continue;
                }
            };

            let reply = match generator.generate_reply(profile, &comment.text).await {
                Ok(r) if !r.trim().is_empty() => r,
                Ok(_) => {
                    warn!(comment = %comment.id, "Respuesta generada vacía, omitida");
                    continue;
                }
                Err(e) => {
                    warn!(comment = %comment.id, "Generación de respuesta fallida: {e}");
                    continue;
                }
            };

            if let Err(e) = post_reply(
                http,
                graph_base,
                comment.platform,
                &comment.external_comment_id,
                &reply,
                &token,
            )
            .await
            {
                warn!(comment = %comment.id, "Publicación de respuesta fallida: {e}");
                continue;
            }

            sqlx::query(
                "UPDATE social_comments
                 SET replied = TRUE, needs_reply = FALSE, reply_text = $1
                 WHERE id = $2",
            )
            .bind(&reply)
            .bind(comment.id)
            .execute(pool)
            .await?;

            replied += 1;
        }

        Ok(replied)
    }
}

/// Graph API reply edge: `/replies` for Instagram comments, `/comments`
/// for Facebook page comments.
async fn post_reply(
    http: &Client,
    graph_base: &str,
    platform: Platform,
    external_comment_id: &str,
    message: &str,
    access_token: &str,
) -> anyhow::Result<()> {
    let edge = match platform {
        Platform::Instagram => "replies",
        Platform::Facebook => "comments",
        Platform::Tiktok => anyhow::bail!("TikTok no soporta respuestas por Graph API"),
    };

    let response = http
        .post(format!("{graph_base}/{external_comment_id}/{edge}"))
        .form(&[("message", message), ("access_token", access_token)])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Graph API error {status}: {body}");
    }

    let body: Value = response.json().await?;
    anyhow::ensure!(
        body["id"].as_str().is_some(),
        "Respuesta del Graph API sin id"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reply_uses_platform_specific_edge() {
        let mut server = mockito::Server::new_async().await;
        let ig = server
            .mock("POST", "/1789_001/replies")
            .match_body(mockito::Matcher::Regex("message=".into()))
            .with_status(200)
            .with_body(r#"{"id":"r1"}"#)
            .create_async()
            .await;
        let fb = server
            .mock("POST", "/104_001/comments")
            .with_status(200)
            .with_body(r#"{"id":"r2"}"#)
            .create_async()
            .await;

        let http = Client::new();
        post_reply(&http, &server.url(), Platform::Instagram, "1789_001", "¡Gracias!", "tok")
            .await
            .unwrap();
        post_reply(&http, &server.url(), Platform::Facebook, "104_001", "¡Gracias!", "tok")
            .await
            .unwrap();

        ig.assert_async().await;
        fb.assert_async().await;
    }

    #[tokio::test]
    async fn tiktok_reply_is_rejected() {
        let err = post_reply(
            &Client::new(),
            "http://127.0.0.1:1",
            Platform::Tiktok,
            "x",
            "hola",
            "tok",
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("TikTok"));
    }
}
