use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::models::{organization::BusinessProfile, social::Platform};

/// Structured output of one generation call.
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    pub content: String,
    pub hashtags: Vec<String>,
}

/// Seam over the LLM provider so the engine can run against a fake in tests.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_post(
        &self,
        profile: &BusinessProfile,
        platform: Platform,
        content_type: &str,
    ) -> anyhow::Result<GeneratedContent>;

    async fn generate_reply(
        &self,
        profile: &BusinessProfile,
        comment_text: &str,
    ) -> anyhow::Result<String>;
}

/// Anthropic Messages API client. Rate-limited and non-deterministic;
/// callers treat every call as fallible.
pub struct AnthropicGenerator {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl AnthropicGenerator {
    pub fn new(client: Client, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: "https://api.anthropic.com/v1".to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("ANTHROPIC_API_KEY no configurada"))?;

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": max_tokens,
                "messages": [{"role": "user", "content": prompt}]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error {status}: {body}");
        }

        let result: Value = response.json().await?;
        let text = result["content"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Respuesta de Anthropic sin contenido"))?;
        Ok(text.to_string())
    }
}

#[async_trait]
impl ContentGenerator for AnthropicGenerator {
    async fn generate_post(
        &self,
        profile: &BusinessProfile,
        platform: Platform,
        content_type: &str,
    ) -> anyhow::Result<GeneratedContent> {
        let prompt = build_post_prompt(profile, platform, content_type);
        let raw = self.complete(&prompt, 1024).await?;
        Ok(parse_generated(&raw, &profile.hashtags))
    }

    async fn generate_reply(
        &self,
        profile: &BusinessProfile,
        comment_text: &str,
    ) -> anyhow::Result<String> {
        let prompt = build_reply_prompt(profile, comment_text);
        let reply = self.complete(&prompt, 256).await?;
        Ok(reply.trim().to_string())
    }
}

fn build_post_prompt(profile: &BusinessProfile, platform: Platform, content_type: &str) -> String {
    let products = if profile.products.is_empty() {
        "ninguno en particular".to_string()
    } else {
        profile.products.join(", ")
    };
    format!(
        "Eres el community manager de un pequeño negocio.\n\
         Voz de marca: {voice}\n\
         Tono: {tone}\n\
         Audiencia: {audience}\n\
         Productos: {products}\n\n\
         Escribe un post de tipo \"{content_type}\" para {platform}.\n\
         Responde SOLO con JSON: {{\"content\": \"...\", \"hashtags\": [\"#...\"]}}",
        voice = profile.brand_voice,
        tone = profile.tone,
        audience = profile.target_audience,
    )
}

fn build_reply_prompt(profile: &BusinessProfile, comment_text: &str) -> String {
    format!(
        "Eres el community manager de un pequeño negocio (voz: {voice}, tono: {tone}).\n\
         Responde en una o dos frases, sin hashtags, a este comentario:\n\n{comment_text}",
        voice = profile.brand_voice,
        tone = profile.tone,
    )
}

/// The model is asked for JSON but can wrap it in prose or a code fence.
/// Fall back to treating the whole completion as the caption with the
/// profile's default hashtags.
fn parse_generated(raw: &str, fallback_hashtags: &[String]) -> GeneratedContent {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };

    if let Ok(v) = serde_json::from_str::<Value>(candidate) {
        if let Some(content) = v["content"].as_str() {
            let hashtags = v["hashtags"]
                .as_array()
                .map(|a| {
                    a.iter()
                        .filter_map(|h| h.as_str())
                        .map(String::from)
                        .collect::<Vec<_>>()
                })
                .filter(|h: &Vec<String>| !h.is_empty())
                .unwrap_or_else(|| fallback_hashtags.to_vec());
            return GeneratedContent {
                content: content.to_string(),
                hashtags,
            };
        }
    }

    GeneratedContent {
        content: trimmed.to_string(),
        hashtags: fallback_hashtags.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            brand_voice: "cercana y directa".into(),
            tone: "informal".into(),
            target_audience: "familias jóvenes".into(),
            hashtags: vec!["#panaderia".into()],
            products: vec!["pan de masa madre".into()],
            is_complete: true,
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn parses_clean_json() {
        let raw = r##"{"content": "Hoy horneamos", "hashtags": ["#pan", "#local"]}"##;
        let out = parse_generated(raw, &[]);
        assert_eq!(out.content, "Hoy horneamos");
        assert_eq!(out.hashtags, vec!["#pan", "#local"]);
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"content\": \"Hola\", \"hashtags\": [\"#a\"]}\n```";
        let out = parse_generated(raw, &[]);
        assert_eq!(out.content, "Hola");
        assert_eq!(out.hashtags, vec!["#a"]);
    }

    #[test]
    fn falls_back_to_plain_text_with_profile_hashtags() {
        let raw = "Un post sin estructura JSON";
        let fallback = vec!["#panaderia".to_string()];
        let out = parse_generated(raw, &fallback);
        assert_eq!(out.content, raw);
        assert_eq!(out.hashtags, fallback);
    }

    #[test]
    fn empty_model_hashtags_use_fallback() {
        let raw = r#"{"content": "Texto", "hashtags": []}"#;
        let fallback = vec!["#x".to_string()];
        let out = parse_generated(raw, &fallback);
        assert_eq!(out.hashtags, fallback);
    }

    #[tokio::test]
    async fn missing_api_key_is_an_error() {
        let gen = AnthropicGenerator::new(Client::new(), None, "claude-3-5-sonnet-latest".into());
        let err = gen
            .generate_post(&profile(), Platform::Instagram, "promotional")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[tokio::test]
    async fn generate_post_calls_messages_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "{\"content\": \"Pan recién hecho\", \"hashtags\": [\"#pan\"]}"}]
        });
        let mock = server
            .mock("POST", "/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", "2023-06-01")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let gen = AnthropicGenerator::new(
            Client::new(),
            Some("test-key".into()),
            "claude-3-5-sonnet-latest".into(),
        )
        .with_base_url(server.url());

        let out = gen
            .generate_post(&profile(), Platform::Instagram, "promotional")
            .await
            .unwrap();
        assert_eq!(out.content, "Pan recién hecho");
        assert_eq!(out.hashtags, vec!["#pan"]);
        mock.assert_async().await;
    }
}
