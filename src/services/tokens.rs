use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::models::social::{Platform, SocialAccount};
use crate::services::encryption::{open_token, seal_token};

/// Refresh window: tokens expiring sooner than this are exchanged.
const REFRESH_WINDOW_DAYS: i64 = 7;

pub struct TokenService;

impl TokenService {
    /// Refresh expiring Meta tokens for one organization's accounts.
    /// On refresh failure of an already-expired token the account is
    /// deactivated; a still-valid token is left for the next pass.
    /// Returns the number of refreshed accounts.
    pub async fn refresh_expiring(
        pool: &PgPool,
        http: &Client,
        graph_base: &str,
        app_id: Option<&str>,
        app_secret: Option<&str>,
        org_key: &[u8; 32],
        accounts: &[SocialAccount],
    ) -> anyhow::Result<usize> {
        let (Some(app_id), Some(app_secret)) = (app_id, app_secret) else {
            return Ok(0);
        };

        let now = Utc::now();
        let window = now + Duration::days(REFRESH_WINDOW_DAYS);
        let mut refreshed = 0usize;

        for account in accounts {
            // Only Meta tokens use the fb_exchange_token flow.
            if account.platform == Platform::Tiktok {
                continue;
            }
            let Some(expires_at) = account.token_expires_at else {
                continue;
            };
            if expires_at > window {
                continue;
            }

            let token = match open_token(&account.access_token_enc, org_key) {
                Ok(t) => t,
                Err(e) => {
                    warn!(account = %account.id, "No se pudo descifrar el token: {e}");
                    continue;
                }
            };

            match exchange_token(http, graph_base, app_id, app_secret, &token).await {
                Ok((new_token, expires_in_secs)) => {
                    let sealed = seal_token(&new_token, org_key)?;
                    let new_expiry = now + Duration::seconds(expires_in_secs);
                    sqlx::query(
                        "UPDATE social_accounts
                         SET access_token_enc = $1, token_expires_at = $2, updated_at = NOW()
                         WHERE id = $3",
                    )
                    .bind(&sealed)
                    .bind(new_expiry)
                    .bind(account.id)
                    .execute(pool)
                    .await?;
                    info!(
                        account = %account.id,
                        platform = %account.platform,
                        "Token renovado, expira {new_expiry}"
                    );
                    refreshed += 1;
                }
                Err(e) => {
                    if expires_at < now {
                        // Expired and unrefreshable: the connection is dead.
                        sqlx::query(
                            "UPDATE social_accounts
                             SET is_active = FALSE, updated_at = NOW()
                             WHERE id = $1",
                        )
                        .bind(account.id)
                        .execute(pool)
                        .await?;
                        warn!(
                            account = %account.id,
                            platform = %account.platform,
                            "Token expirado y renovación fallida, cuenta desactivada: {e}"
                        );
                    } else {
                        warn!(
                            account = %account.id,
                            platform = %account.platform,
                            "Renovación de token fallida, se reintentará en la próxima pasada: {e}"
                        );
                    }
                }
            }
        }

        Ok(refreshed)
    }
}

/// Meta long-lived token exchange. Returns (token, expires_in seconds).
async fn exchange_token(
    http: &Client,
    graph_base: &str,
    app_id: &str,
    app_secret: &str,
    current_token: &str,
) -> anyhow::Result<(String, i64)> {
    let response = http
        .get(format!("{graph_base}/oauth/access_token"))
        .query(&[
            ("grant_type", "fb_exchange_token"),
            ("client_id", app_id),
            ("client_secret", app_secret),
            ("fb_exchange_token", current_token),
        ])
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        anyhow::bail!("Graph API error {status}: {body}");
    }

    let token = body["access_token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Respuesta sin access_token"))?
        .to_string();
    // Meta long-lived tokens default to ~60 days when expires_in is absent.
    let expires_in = body["expires_in"].as_i64().unwrap_or(60 * 24 * 3600);

    Ok((token, expires_in))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exchange_parses_token_and_expiry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/oauth/access_token")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "fb_exchange_token".into()),
                mockito::Matcher::UrlEncoded("fb_exchange_token".into(), "old".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"new-token","token_type":"bearer","expires_in":5184000}"#)
            .create_async()
            .await;

        let (token, expires_in) =
            exchange_token(&Client::new(), &server.url(), "app", "secret", "old")
                .await
                .unwrap();
        assert_eq!(token, "new-token");
        assert_eq!(expires_in, 5_184_000);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_error_propagates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/oauth/access_token")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"message":"Invalid OAuth access token"}}"#)
            .create_async()
            .await;

        let err = exchange_token(&Client::new(), &server.url(), "app", "secret", "old")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("400"));
    }
}
