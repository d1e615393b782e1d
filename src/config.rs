use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cron_secret: String,
    pub token_encryption_secret: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub pagespeed_api_key: Option<String>,
    pub meta_app_id: Option<String>,
    pub meta_app_secret: Option<String>,
    pub tiktok_client_key: Option<String>,
    pub banned_phrases: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            cron_secret: required("CRON_SECRET")?,
            token_encryption_secret: required("TOKEN_ENCRYPTION_SECRET")?,
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok().filter(|s| !s.is_empty()),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-3-5-sonnet-latest".into()),
            pagespeed_api_key: env::var("GOOGLE_PAGESPEED_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            meta_app_id: env::var("META_APP_ID").ok().filter(|s| !s.is_empty()),
            meta_app_secret: env::var("META_APP_SECRET").ok().filter(|s| !s.is_empty()),
            tiktok_client_key: env::var("TIKTOK_CLIENT_KEY").ok().filter(|s| !s.is_empty()),
            banned_phrases: env::var("BANNED_PHRASES")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Decode the 32-byte master key from its hex form.
    pub fn master_key(&self) -> anyhow::Result<[u8; 32]> {
        let bytes = hex::decode(&self.token_encryption_secret)
            .map_err(|_| anyhow::anyhow!("TOKEN_ENCRYPTION_SECRET must be hex-encoded"))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("TOKEN_ENCRYPTION_SECRET must decode to 32 bytes"))?;
        Ok(key)
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
