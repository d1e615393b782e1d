use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::cron_log::RunStatus;
use crate::models::organization::{BusinessProfile, MarketingConfig, Organization};
use crate::models::post::{MarketingPost, CONTENT_TYPES};
use crate::models::seo::SeoConfig;
use crate::models::social::{Platform, SocialAccount};
use crate::services::comments::CommentService;
use crate::services::content;
use crate::services::cron_log::CronLogService;
use crate::services::encryption::{derive_org_key, open_token};
use crate::services::generator::ContentGenerator;
use crate::services::guard::ContentGuard;
use crate::services::metrics::{
    COMMENTS_REPLIED_COUNTER, CONTENT_GENERATED_COUNTER, ENGINE_RUNS_COUNTER,
    POSTS_PUBLISHED_COUNTER,
};
use crate::services::publishers::{PublisherAccount, PublisherRegistry, GRAPH_API_BASE};
use crate::services::seo::SeoService;
use crate::services::tokens::TokenService;

/// Cap on posts published per pass, to stay under the request timeout of
/// the hosting platform.
const PUBLISH_BATCH_LIMIT: i64 = 50;

/// Explicit engine configuration, passed at construction so the
/// orchestrator never reads the ambient environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub graph_api_base: String,
    pub meta_app_id: Option<String>,
    pub meta_app_secret: Option<String>,
    pub pagespeed_api_key: Option<String>,
    pub master_key: [u8; 32],
}

impl EngineConfig {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            graph_api_base: GRAPH_API_BASE.to_string(),
            meta_app_id: config.meta_app_id.clone(),
            meta_app_secret: config.meta_app_secret.clone(),
            pagespeed_api_key: config.pagespeed_api_key.clone(),
            master_key: config.master_key()?,
        })
    }
}

/// Where an error was isolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorScope {
    Organization,
    Post,
}

/// One recorded failure. Structured so callers can assert on scope and id
/// instead of substring-matching messages.
#[derive(Debug, Clone, Serialize)]
pub struct RunError {
    pub scope: ErrorScope,
    pub id: String,
    pub message: String,
}

impl RunError {
    fn organization(id: Uuid, message: impl ToString) -> Self {
        Self {
            scope: ErrorScope::Organization,
            id: id.to_string(),
            message: message.to_string(),
        }
    }

    fn post(id: impl ToString, message: impl ToString) -> Self {
        Self {
            scope: ErrorScope::Post,
            id: id.to_string(),
            message: message.to_string(),
        }
    }
}

/// Aggregated counters for one pass. Serialized into the run ledger.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub organizations_processed: u32,
    pub content_generated: u32,
    pub posts_published: u32,
    pub seo_analyzed: u32,
    pub comments_replied: u32,
    pub tokens_refreshed: u32,
    pub errors: Vec<RunError>,
}

/// Outcome of a pass: the (possibly partial) counters plus the terminal
/// ledger status. A `Failed` report still carries everything done before
/// the top-level error.
#[derive(Debug)]
pub struct RunReport {
    pub result: RunResult,
    pub status: RunStatus,
    pub error: Option<String>,
}

/// Reasons an organization is skipped for a whole pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Paused,
    ProfileIncomplete,
}

/// Everything the engine needs about one organization, loaded eagerly at
/// the start of a pass.
#[derive(Debug)]
pub struct OrgSnapshot {
    pub org: Organization,
    pub profile: Option<BusinessProfile>,
    pub config: Option<MarketingConfig>,
    pub accounts: Vec<SocialAccount>,
    pub seo: Option<SeoConfig>,
}

impl OrgSnapshot {
    pub fn skip_reason(&self) -> Option<SkipReason> {
        if self.config.as_ref().is_some_and(|c| c.is_paused) {
            return Some(SkipReason::Paused);
        }
        if !self.profile.as_ref().is_some_and(|p| p.is_complete) {
            return Some(SkipReason::ProfileIncomplete);
        }
        None
    }

    /// Connected platforms in connection order (accounts are loaded
    /// ordered by created_at).
    pub fn connected_platforms(&self) -> Vec<Platform> {
        self.accounts
            .iter()
            .filter(|a| a.is_active)
            .map(|a| a.platform)
            .collect()
    }
}

enum Mode {
    Full,
    PublishOnly,
    Social,
}

impl Mode {
    fn job_name(&self) -> &'static str {
        match self {
            Mode::Full => "marketing-engine",
            Mode::PublishOnly => "publish-scheduled",
            Mode::Social => "social-publish",
        }
    }
}

/// The cron-driven orchestrator. Single-threaded and sequential: one
/// organization at a time, one post at a time, failures isolated at the
/// smallest enclosing unit.
pub struct MarketingEngine {
    pool: PgPool,
    cfg: EngineConfig,
    http: Client,
    generator: Arc<dyn ContentGenerator>,
    publishers: PublisherRegistry,
    guard: ContentGuard,
}

impl MarketingEngine {
    pub fn new(
        pool: PgPool,
        cfg: EngineConfig,
        generator: Arc<dyn ContentGenerator>,
        publishers: PublisherRegistry,
        guard: ContentGuard,
    ) -> Self {
        Self {
            pool,
            cfg,
            http: Client::new(),
            generator,
            publishers,
            guard,
        }
    }

    /// Full pass: content generation, publishing, SEO and comment replies
    /// for every eligible organization.
    pub async fn run(&self) -> anyhow::Result<RunReport> {
        self.run_job(Mode::Full).await
    }

    /// Publish-only pass over all organizations, capped at 50 posts.
    pub async fn run_publish_pass(&self) -> anyhow::Result<RunReport> {
        self.run_job(Mode::PublishOnly).await
    }

    /// Social maintenance pass: token refresh and comment replies.
    pub async fn run_social_pass(&self) -> anyhow::Result<RunReport> {
        self.run_job(Mode::Social).await
    }

    async fn run_job(&self, mode: Mode) -> anyhow::Result<RunReport> {
        let job = mode.job_name();
        let started = Instant::now();
        let log_id = CronLogService::open(&self.pool, job).await?;
        let mut result = RunResult::default();

        let outcome = match mode {
            Mode::Full => self.full_pass(&mut result).await,
            Mode::PublishOnly => {
                self.publish_due_posts(None, PUBLISH_BATCH_LIMIT, &mut result)
                    .await
            }
            Mode::Social => self.social_pass(&mut result).await,
        };

        let duration_ms = started.elapsed().as_millis() as i64;
        let results_json = serde_json::to_string(&result)?;

        // The single terminal update for the ledger row opened above.
        match outcome {
            Ok(()) => {
                CronLogService::complete(&self.pool, log_id, &results_json, duration_ms).await?;
                ENGINE_RUNS_COUNTER
                    .with_label_values(&[job, "completed"])
                    .inc();
                info!(
                    job,
                    duration_ms,
                    orgs = result.organizations_processed,
                    generated = result.content_generated,
                    published = result.posts_published,
                    errors = result.errors.len(),
                    "Pasada completada"
                );
                Ok(RunReport {
                    result,
                    status: RunStatus::Completed,
                    error: None,
                })
            }
            Err(e) => {
                let message = format!("{e:#}");
                if let Err(update_err) =
                    CronLogService::fail(&self.pool, log_id, &message, &results_json, duration_ms)
                        .await
                {
                    warn!(job, "No se pudo cerrar el registro del cron: {update_err}");
                }
                ENGINE_RUNS_COUNTER
                    .with_label_values(&[job, "failed"])
                    .inc();
                warn!(job, duration_ms, "Pasada fallida: {message}");
                Ok(RunReport {
                    result,
                    status: RunStatus::Failed,
                    error: Some(message),
                })
            }
        }
    }

    async fn full_pass(&self, result: &mut RunResult) -> anyhow::Result<()> {
        let snapshots = self.load_snapshots().await?;
        info!("Motor de marketing: {} organizaciones cargadas", snapshots.len());

        for snap in &snapshots {
            if let Some(reason) = snap.skip_reason() {
                debug!(org = %snap.org.slug, ?reason, "Organización omitida");
                continue;
            }
            result.organizations_processed += 1;
            if let Err(e) = self.process_organization(snap, result).await {
                warn!(org = %snap.org.slug, "Fallo en organización: {e:#}");
                result.errors.push(RunError::organization(snap.org.id, format!("{e:#}")));
            }
        }
        Ok(())
    }

    async fn social_pass(&self, result: &mut RunResult) -> anyhow::Result<()> {
        let snapshots = self.load_snapshots().await?;

        for snap in &snapshots {
            if let Some(reason) = snap.skip_reason() {
                debug!(org = %snap.org.slug, ?reason, "Organización omitida");
                continue;
            }
            result.organizations_processed += 1;
            if let Err(e) = self.social_steps(snap, result).await {
                warn!(org = %snap.org.slug, "Fallo en organización: {e:#}");
                result.errors.push(RunError::organization(snap.org.id, format!("{e:#}")));
            }
        }
        Ok(())
    }

    /// The four per-organization steps of the full pass, in order. An
    /// error in any step aborts the rest of this organization's pass.
    async fn process_organization(
        &self,
        snap: &OrgSnapshot,
        result: &mut RunResult,
    ) -> anyhow::Result<()> {
        let org_key = derive_org_key(&self.cfg.master_key, snap.org.id)?;

        let refreshed = TokenService::refresh_expiring(
            &self.pool,
            &self.http,
            &self.cfg.graph_api_base,
            self.cfg.meta_app_id.as_deref(),
            self.cfg.meta_app_secret.as_deref(),
            &org_key,
            &snap.accounts,
        )
        .await?;
        result.tokens_refreshed += refreshed as u32;

        self.generate_content_step(snap, result).await?;
        self.publish_due_posts(Some(snap.org.id), PUBLISH_BATCH_LIMIT, result)
            .await?;
        self.seo_step(snap, result).await?;
        self.comments_step(snap, &org_key, result).await?;
        Ok(())
    }

    async fn social_steps(
        &self,
        snap: &OrgSnapshot,
        result: &mut RunResult,
    ) -> anyhow::Result<()> {
        let org_key = derive_org_key(&self.cfg.master_key, snap.org.id)?;

        let refreshed = TokenService::refresh_expiring(
            &self.pool,
            &self.http,
            &self.cfg.graph_api_base,
            self.cfg.meta_app_id.as_deref(),
            self.cfg.meta_app_secret.as_deref(),
            &org_key,
            &snap.accounts,
        )
        .await?;
        result.tokens_refreshed += refreshed as u32;

        self.comments_step(snap, &org_key, result).await?;
        Ok(())
    }

    /// Keep the near-term queue at seven days of posts, generating at most
    /// three per pass. Individual generation failures are recorded and the
    /// rest of the batch continues.
    async fn generate_content_step(
        &self,
        snap: &OrgSnapshot,
        result: &mut RunResult,
    ) -> anyhow::Result<()> {
        // Eligibility has already been checked; a missing profile row
        // just means nothing to generate.
        let Some(profile) = snap.profile.as_ref() else {
            return Ok(());
        };

        let scheduled: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)::BIGINT FROM marketing_posts
             WHERE organization_id = $1
               AND status = 'scheduled'
               AND scheduled_at BETWEEN NOW() AND NOW() + INTERVAL '7 days'",
        )
        .bind(snap.org.id)
        .fetch_one(&self.pool)
        .await?;

        let needed = content::posts_needed(scheduled);
        if needed == 0 {
            return Ok(());
        }

        let connected = snap.connected_platforms();
        let today = Utc::now().date_naive();

        for i in 0..needed {
            let platform = content::platform_for_offset(&connected, i);
            let content_type = CONTENT_TYPES[i % CONTENT_TYPES.len()];

            let generated = match self
                .generator
                .generate_post(profile, platform, content_type)
                .await
            {
                Ok(g) => g,
                Err(e) => {
                    warn!(org = %snap.org.slug, %platform, "Generación fallida: {e:#}");
                    result.errors.push(RunError::post(
                        format!("{}/draft-{}", snap.org.id, i),
                        format!("{e:#}"),
                    ));
                    continue;
                }
            };

            let verdict = self
                .guard
                .check(platform, &generated.content, &generated.hashtags);
            if !verdict.passed {
                let message = format!(
                    "Contenido rechazado (puntuación {}): {}",
                    verdict.score,
                    verdict.violations.join("; ")
                );
                warn!(org = %snap.org.slug, %platform, "{message}");
                result
                    .errors
                    .push(RunError::post(format!("{}/draft-{}", snap.org.id, i), message));
                continue;
            }

            let scheduled_at = content::slot_for_offset(today, i);
            sqlx::query(
                "INSERT INTO marketing_posts
                     (organization_id, platform, status, content, hashtags, content_type, scheduled_at)
                 VALUES ($1, $2, 'scheduled', $3, $4, $5, $6)",
            )
            .bind(snap.org.id)
            .bind(platform)
            .bind(&generated.content)
            .bind(&generated.hashtags)
            .bind(content_type)
            .bind(scheduled_at)
            .execute(&self.pool)
            .await?;

            result.content_generated += 1;
            CONTENT_GENERATED_COUNTER
                .with_label_values(&[platform.as_str()])
                .inc();
        }

        Ok(())
    }

    /// Publish every due post (status scheduled, due now), oldest first.
    /// Adapter failures mark the post `failed` and never abort the batch;
    /// `failed` is terminal: the query only ever selects `scheduled`.
    async fn publish_due_posts(
        &self,
        organization: Option<Uuid>,
        limit: i64,
        result: &mut RunResult,
    ) -> anyhow::Result<()> {
        let due: Vec<MarketingPost> = match organization {
            Some(org_id) => {
                sqlx::query_as(
                    "SELECT * FROM marketing_posts
                     WHERE organization_id = $1
                       AND status = 'scheduled' AND scheduled_at <= NOW()
                     ORDER BY scheduled_at ASC
                     LIMIT $2",
                )
                .bind(org_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT p.* FROM marketing_posts p
                     LEFT JOIN marketing_configs mc ON mc.organization_id = p.organization_id
                     WHERE p.status = 'scheduled' AND p.scheduled_at <= NOW()
                       AND COALESCE(mc.is_paused, FALSE) = FALSE
                     ORDER BY p.scheduled_at ASC
                     LIMIT $1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        if due.is_empty() {
            return Ok(());
        }

        let mut account_cache: HashMap<Uuid, HashMap<Platform, SocialAccount>> = HashMap::new();

        for post in due {
            let accounts = match account_cache.entry(post.organization_id) {
                std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
                std::collections::hash_map::Entry::Vacant(e) => {
                    let rows: Vec<SocialAccount> = sqlx::query_as(
                        "SELECT * FROM social_accounts
                         WHERE organization_id = $1 AND is_active = TRUE",
                    )
                    .bind(post.organization_id)
                    .fetch_all(&self.pool)
                    .await?;
                    e.insert(rows.into_iter().map(|a| (a.platform, a)).collect())
                }
            };

            let Some(account) = accounts.get(&post.platform) else {
                let message = format!(
                    "No hay una cuenta de {} activa conectada",
                    post.platform
                );
                self.mark_failed(post.id, &message).await?;
                result.errors.push(RunError::post(post.id, &message));
                POSTS_PUBLISHED_COUNTER
                    .with_label_values(&[post.platform.as_str(), "failed"])
                    .inc();
                continue;
            };

            let org_key = derive_org_key(&self.cfg.master_key, post.organization_id)?;
            let access_token = match open_token(&account.access_token_enc, &org_key) {
                Ok(t) => t,
                Err(e) => {
                    let message = format!("No se pudo descifrar el token: {e}");
                    self.mark_failed(post.id, &message).await?;
                    result.errors.push(RunError::post(post.id, &message));
                    POSTS_PUBLISHED_COUNTER
                        .with_label_values(&[post.platform.as_str(), "failed"])
                        .inc();
                    continue;
                }
            };

            let Some(publisher) = self.publishers.get(post.platform) else {
                let message = format!("Publicador de {} no registrado", post.platform);
                self.mark_failed(post.id, &message).await?;
                result.errors.push(RunError::post(post.id, &message));
                continue;
            };

            sqlx::query(
                "UPDATE marketing_posts SET status = 'publishing', updated_at = NOW() WHERE id = $1",
            )
            .bind(post.id)
            .execute(&self.pool)
            .await?;

            let credentials = PublisherAccount {
                business_id: account.business_id.clone(),
                access_token,
            };

            match publisher.publish(&credentials, &post).await {
                Ok(published) => {
                    sqlx::query(
                        "UPDATE marketing_posts
                         SET status = 'published', external_id = $1, external_url = $2,
                             published_at = NOW(), publish_error = NULL, updated_at = NOW()
                         WHERE id = $3",
                    )
                    .bind(&published.post_id)
                    .bind(&published.url)
                    .bind(post.id)
                    .execute(&self.pool)
                    .await?;
                    result.posts_published += 1;
                    POSTS_PUBLISHED_COUNTER
                        .with_label_values(&[post.platform.as_str(), "published"])
                        .inc();
                    info!(
                        post = %post.id,
                        platform = %post.platform,
                        external_id = %published.post_id,
                        "Post publicado"
                    );
                }
                Err(e) => {
                    let message = e.to_string();
                    self.mark_failed(post.id, &message).await?;
                    result.errors.push(RunError::post(post.id, &message));
                    POSTS_PUBLISHED_COUNTER
                        .with_label_values(&[post.platform.as_str(), "failed"])
                        .inc();
                    warn!(post = %post.id, platform = %post.platform, "Publicación fallida: {message}");
                }
            }
        }

        Ok(())
    }

    async fn seo_step(&self, snap: &OrgSnapshot, result: &mut RunResult) -> anyhow::Result<()> {
        if let Some(seo) = &snap.seo {
            let scanned = SeoService::scan_if_due(
                &self.pool,
                &self.http,
                self.cfg.pagespeed_api_key.as_deref(),
                seo,
            )
            .await?;
            if scanned {
                result.seo_analyzed += 1;
            }
        }
        Ok(())
    }

    async fn comments_step(
        &self,
        snap: &OrgSnapshot,
        org_key: &[u8; 32],
        result: &mut RunResult,
    ) -> anyhow::Result<()> {
        let Some(profile) = snap.profile.as_ref() else {
            return Ok(());
        };

        let replied = CommentService::reply_pending(
            &self.pool,
            &self.http,
            &self.cfg.graph_api_base,
            &self.generator,
            profile,
            &snap.accounts,
            org_key,
            snap.org.id,
        )
        .await?;

        if replied > 0 {
            result.comments_replied += replied as u32;
            COMMENTS_REPLIED_COUNTER
                .with_label_values(&[&snap.org.slug])
                .inc_by(replied as f64);
        }
        Ok(())
    }

    async fn mark_failed(&self, post_id: Uuid, error: &str) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE marketing_posts
             SET status = 'failed', publish_error = $1, updated_at = NOW()
             WHERE id = $2",
        )
        .bind(error)
        .bind(post_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_snapshots(&self) -> anyhow::Result<Vec<OrgSnapshot>> {
        let orgs: Vec<Organization> =
            sqlx::query_as("SELECT * FROM organizations ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?;

        let profiles: Vec<BusinessProfile> = sqlx::query_as("SELECT * FROM business_profiles")
            .fetch_all(&self.pool)
            .await?;
        let configs: Vec<MarketingConfig> = sqlx::query_as("SELECT * FROM marketing_configs")
            .fetch_all(&self.pool)
            .await?;
        let accounts: Vec<SocialAccount> = sqlx::query_as(
            "SELECT * FROM social_accounts WHERE is_active = TRUE ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        let seos: Vec<SeoConfig> = sqlx::query_as("SELECT * FROM seo_configs")
            .fetch_all(&self.pool)
            .await?;

        let mut profile_map: HashMap<Uuid, BusinessProfile> = profiles
            .into_iter()
            .map(|p| (p.organization_id, p))
            .collect();
        let mut config_map: HashMap<Uuid, MarketingConfig> = configs
            .into_iter()
            .map(|c| (c.organization_id, c))
            .collect();
        let mut seo_map: HashMap<Uuid, SeoConfig> =
            seos.into_iter().map(|s| (s.organization_id, s)).collect();
        let mut account_map: HashMap<Uuid, Vec<SocialAccount>> = HashMap::new();
        for account in accounts {
            account_map
                .entry(account.organization_id)
                .or_default()
                .push(account);
        }

        Ok(orgs
            .into_iter()
            .map(|org| {
                let id = org.id;
                OrgSnapshot {
                    org,
                    profile: profile_map.remove(&id),
                    config: config_map.remove(&id),
                    accounts: account_map.remove(&id).unwrap_or_default(),
                    seo: seo_map.remove(&id),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn organization() -> Organization {
        Organization {
            id: Uuid::new_v4(),
            slug: "panaderia-sol".into(),
            name: "Panadería Sol".into(),
            created_at: Utc::now(),
        }
    }

    fn profile(org: &Organization, is_complete: bool) -> BusinessProfile {
        BusinessProfile {
            id: Uuid::new_v4(),
            organization_id: org.id,
            brand_voice: "cercana".into(),
            tone: "informal".into(),
            target_audience: "vecinos del barrio".into(),
            hashtags: vec![],
            products: vec![],
            is_complete,
            updated_at: Utc::now(),
        }
    }

    fn config(org: &Organization, is_paused: bool) -> MarketingConfig {
        MarketingConfig {
            id: Uuid::new_v4(),
            organization_id: org.id,
            is_paused,
            updated_at: Utc::now(),
        }
    }

    fn account(org: &Organization, platform: Platform) -> SocialAccount {
        SocialAccount {
            id: Uuid::new_v4(),
            organization_id: org.id,
            platform,
            account_name: "cuenta".into(),
            business_id: "123".into(),
            access_token_enc: "aa:bb".into(),
            refresh_token_enc: None,
            token_expires_at: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn snapshot(
        profile_complete: Option<bool>,
        paused: Option<bool>,
        platforms: &[Platform],
    ) -> OrgSnapshot {
        let org = organization();
        OrgSnapshot {
            profile: profile_complete.map(|c| profile(&org, c)),
            config: paused.map(|p| config(&org, p)),
            accounts: platforms.iter().map(|p| account(&org, *p)).collect(),
            seo: None,
            org,
        }
    }

    #[test]
    fn paused_organizations_are_skipped() {
        let snap = snapshot(Some(true), Some(true), &[]);
        assert_eq!(snap.skip_reason(), Some(SkipReason::Paused));
    }

    #[test]
    fn incomplete_profile_is_skipped() {
        let snap = snapshot(Some(false), Some(false), &[]);
        assert_eq!(snap.skip_reason(), Some(SkipReason::ProfileIncomplete));
        let no_profile = snapshot(None, Some(false), &[]);
        assert_eq!(no_profile.skip_reason(), Some(SkipReason::ProfileIncomplete));
    }

    #[test]
    fn complete_unpaused_organization_is_eligible() {
        let snap = snapshot(Some(true), Some(false), &[]);
        assert_eq!(snap.skip_reason(), None);
        // Missing config rows behave as not paused.
        let no_config = snapshot(Some(true), None, &[]);
        assert_eq!(no_config.skip_reason(), None);
    }

    #[test]
    fn connected_platforms_preserve_connection_order() {
        let snap = snapshot(
            Some(true),
            Some(false),
            &[Platform::Facebook, Platform::Instagram],
        );
        assert_eq!(
            snap.connected_platforms(),
            vec![Platform::Facebook, Platform::Instagram]
        );
    }

    #[test]
    fn run_result_serializes_with_camel_case_keys() {
        let mut result = RunResult::default();
        result.organizations_processed = 1;
        result.errors.push(RunError::post(Uuid::new_v4(), "boom"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["organizationsProcessed"], 1);
        assert_eq!(json["postsPublished"], 0);
        assert_eq!(json["errors"][0]["scope"], "post");
        assert_eq!(json["errors"][0]["message"], "boom");
    }
}
