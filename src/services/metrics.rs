use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Gauge, GaugeVec};
use sqlx::PgPool;
use tracing::{info, warn};

lazy_static! {
    // ── Event counters (increment on each event) ────────────────────────────
    pub static ref ENGINE_RUNS_COUNTER: CounterVec = register_counter_vec!(
        "engine_runs_total",
        "Pasadas del motor por job y estado",
        &["job", "status"]
    ).unwrap();

    pub static ref CONTENT_GENERATED_COUNTER: CounterVec = register_counter_vec!(
        "engine_content_generated_total",
        "Posts generados por plataforma",
        &["platform"]
    ).unwrap();

    pub static ref POSTS_PUBLISHED_COUNTER: CounterVec = register_counter_vec!(
        "engine_posts_published_total",
        "Intentos de publicación por plataforma y resultado",
        &["platform", "result"]
    ).unwrap();

    pub static ref COMMENTS_REPLIED_COUNTER: CounterVec = register_counter_vec!(
        "engine_comments_replied_total",
        "Comentarios respondidos por organización",
        &["organization"]
    ).unwrap();

    // ── Business gauges ─────────────────────────────────────────────────────
    pub static ref ORGANIZATIONS_GAUGE: Gauge = register_gauge!(
        "marketingos_organizations_total",
        "Organizaciones registradas"
    ).unwrap();

    pub static ref POSTS_GAUGE: GaugeVec = register_gauge_vec!(
        "marketingos_posts_total",
        "Posts por estado",
        &["status"]
    ).unwrap();

    pub static ref ACCOUNTS_GAUGE: GaugeVec = register_gauge_vec!(
        "marketingos_social_accounts_active_total",
        "Cuentas sociales activas por plataforma",
        &["platform"]
    ).unwrap();
}

/// Spawn the background gauge collector (refreshes every 5 minutes).
pub fn start(pool: PgPool) {
    tokio::spawn(async move {
        if let Err(e) = collect(&pool).await {
            warn!("Metrics: initial collection failed: {}", e);
        }
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
            if let Err(e) = collect(&pool).await {
                warn!("Metrics: collection failed: {}", e);
            }
        }
    });
}

async fn collect(pool: &PgPool) -> anyhow::Result<()> {
    let organizations: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM organizations")
        .fetch_one(pool)
        .await?;
    ORGANIZATIONS_GAUGE.set(organizations as f64);

    let post_counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*)::BIGINT FROM marketing_posts GROUP BY status",
    )
    .fetch_all(pool)
    .await
    .unwrap_or_default();
    for (status, count) in post_counts {
        POSTS_GAUGE.with_label_values(&[&status]).set(count as f64);
    }

    let account_counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT platform, COUNT(*)::BIGINT FROM social_accounts WHERE is_active = TRUE GROUP BY platform",
    )
    .fetch_all(pool)
    .await
    .unwrap_or_default();
    for (platform, count) in account_counts {
        ACCOUNTS_GAUGE.with_label_values(&[&platform]).set(count as f64);
    }

    info!("Metrics: collected for {} organization(s)", organizations);
    Ok(())
}
