use std::sync::Arc;

use axum::{routing::get, Router};
use reqwest::Client;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketingos_api::config::Config;
use marketingos_api::services::engine::{EngineConfig, MarketingEngine};
use marketingos_api::services::generator::AnthropicGenerator;
use marketingos_api::services::guard::ContentGuard;
use marketingos_api::services::publishers::PublisherRegistry;
use marketingos_api::{db, routes, services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let http = Client::new();
    let generator = Arc::new(AnthropicGenerator::new(
        http.clone(),
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
    ));
    if config.anthropic_api_key.is_some() {
        info!("Anthropic generator configured (model {})", config.anthropic_model);
    } else {
        info!("ANTHROPIC_API_KEY not set — content generation will report errors");
    }

    let engine = Arc::new(MarketingEngine::new(
        pool.clone(),
        EngineConfig::from_config(&config)?,
        generator,
        PublisherRegistry::standard(http),
        ContentGuard::new(config.banned_phrases.clone()),
    ));

    services::metrics::start(pool.clone());

    let state = AppState {
        db: pool,
        config: config.clone(),
        engine,
    };

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Cron triggers (shared-secret bearer auth)
        .route("/api/cron/marketing-engine", get(routes::cron::marketing_engine))
        .route("/api/cron/publish-scheduled", get(routes::cron::publish_scheduled))
        .route("/api/cron/social-publish", get(routes::cron::social_publish))
        .route("/api/cron/runs", get(routes::cron::list_runs))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("marketingos API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
