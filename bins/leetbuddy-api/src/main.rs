mod error;
mod handlers;
mod metrics;
mod routes;

use anyhow::Context;
use leetbuddy_common::catalog::{InMemoryCatalog, ProblemCatalog, RedisCatalog};
use leetbuddy_common::config::Settings;
use leetbuddy_common::language_config::LanguageRegistry;
use leetbuddy_judge::{Judge, Judge0Client, Judge0Config};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub struct AppState {
    pub judge: Judge,
}

async fn open_catalog(settings: &Settings) -> anyhow::Result<Arc<dyn ProblemCatalog>> {
    match &settings.redis_url {
        Some(redis_url) => {
            let catalog = RedisCatalog::connect(redis_url)
                .await
                .with_context(|| format!("Failed to connect to Redis at {}", redis_url))?;
            info!("Using Redis catalog: {}", redis_url);
            Ok(Arc::new(catalog))
        }
        None => {
            let catalog = InMemoryCatalog::load(&settings.catalog_path)
                .with_context(|| format!("Failed to load catalog {}", settings.catalog_path))?;
            info!(
                problems = catalog.len(),
                "Using file catalog: {}", settings.catalog_path
            );
            Ok(Arc::new(catalog))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("LeetBuddy API booting...");

    let settings = Settings::from_env().context("Invalid configuration")?;

    let languages = LanguageRegistry::load_from_file(&settings.languages_path)
        .with_context(|| format!("Failed to load {}", settings.languages_path))?;
    info!(languages = ?languages.enabled_languages(), "Languages loaded");

    let catalog = open_catalog(&settings).await?;

    let executor = Judge0Client::new(Judge0Config::from_settings(&settings))?;
    let judge0 = executor.config();
    info!(
        base_url = %judge0.base_url,
        base64 = judge0.base64,
        poll_interval_ms = judge0.poll.interval.as_millis() as u64,
        poll_max_attempts = judge0.poll.max_attempts,
        "Judge0 client configured"
    );

    let judge = Judge::new(Arc::new(executor), catalog, languages)?
        .with_inter_test_delay(settings.inter_test_delay());

    metrics::init();
    let state = Arc::new(AppState { judge });

    // Build router
    let app = routes::routes().with_state(state);

    // Start server
    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);
    info!("Ready to judge submissions");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
