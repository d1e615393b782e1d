/// Fire one engine pass from a shell, against the configured database.
///
/// Usage: run-engine [--job marketing-engine|publish-scheduled|social-publish]

use clap::Parser;
use std::sync::Arc;

use marketingos_api::config::Config;
use marketingos_api::db;
use marketingos_api::services::engine::{EngineConfig, MarketingEngine};
use marketingos_api::services::generator::AnthropicGenerator;
use marketingos_api::services::guard::ContentGuard;
use marketingos_api::services::publishers::PublisherRegistry;

#[derive(Parser)]
#[command(name = "run-engine", about = "Run one marketing engine pass")]
struct Args {
    /// Which pass to run
    #[arg(long, default_value = "marketing-engine")]
    job: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let http = reqwest::Client::new();
    let generator = Arc::new(AnthropicGenerator::new(
        http.clone(),
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
    ));
    let engine = MarketingEngine::new(
        pool,
        EngineConfig::from_config(&config)?,
        generator,
        PublisherRegistry::standard(http),
        ContentGuard::new(config.banned_phrases.clone()),
    );

    let report = match args.job.as_str() {
        "marketing-engine" => engine.run().await?,
        "publish-scheduled" => engine.run_publish_pass().await?,
        "social-publish" => engine.run_social_pass().await?,
        other => return Err(format!("Unknown job: {other}").into()),
    };

    println!("{}", serde_json::to_string_pretty(&report.result)?);
    if let Some(error) = report.error {
        tracing::error!("Pass failed: {error}");
        std::process::exit(1);
    }

    Ok(())
}
