use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;

use crate::models::seo::SeoConfig;

const PAGESPEED_ENDPOINT: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

pub struct SeoService;

impl SeoService {
    /// Scan the organization's target URL when due (at most once per 24h).
    /// Returns true when a scan was performed.
    pub async fn scan_if_due(
        pool: &PgPool,
        http: &Client,
        api_key: Option<&str>,
        config: &SeoConfig,
    ) -> anyhow::Result<bool> {
        let Some(api_key) = api_key else {
            return Ok(false);
        };
        let now = Utc::now();
        if !config.scan_due(now) {
            return Ok(false);
        }
        let Some(url) = config.target_url.as_deref() else {
            return Ok(false);
        };

        let score = Self::fetch_score(http, PAGESPEED_ENDPOINT, api_key, url).await?;

        sqlx::query(
            "UPDATE seo_configs
             SET last_scanned_at = $1, last_score = $2
             WHERE id = $3",
        )
        .bind(now)
        .bind(score)
        .bind(config.id)
        .execute(pool)
        .await?;

        info!(org = %config.organization_id, %url, score, "SEO scan completado");
        Ok(true)
    }

    /// Lighthouse performance score as 0–100.
    async fn fetch_score(
        http: &Client,
        endpoint: &str,
        api_key: &str,
        url: &str,
    ) -> anyhow::Result<i16> {
        let response = http
            .get(endpoint)
            .query(&[
                ("url", url),
                ("key", api_key),
                ("category", "performance"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("PageSpeed API error {status}: {body}");
        }

        let body: Value = response.json().await?;
        let score = body["lighthouseResult"]["categories"]["performance"]["score"]
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("Respuesta de PageSpeed sin puntuación"))?;

        Ok((score * 100.0).round() as i16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_score_scales_lighthouse_fraction() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/runPagespeed")
            .match_query(mockito::Matcher::UrlEncoded(
                "url".into(),
                "https://example.com".into(),
            ))
            .with_status(200)
            .with_body(
                r#"{"lighthouseResult":{"categories":{"performance":{"score":0.87}}}}"#,
            )
            .create_async()
            .await;

        let endpoint = format!("{}/runPagespeed", server.url());
        let score = SeoService::fetch_score(&Client::new(), &endpoint, "key", "https://example.com")
            .await
            .unwrap();
        assert_eq!(score, 87);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_score_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/runPagespeed")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"lighthouseResult":{}}"#)
            .create_async()
            .await;

        let endpoint = format!("{}/runPagespeed", server.url());
        let err = SeoService::fetch_score(&Client::new(), &endpoint, "key", "https://example.com")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("puntuación"));
    }
}
