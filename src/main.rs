mod ai;
mod auth;
mod config;
mod crypto;
mod db;
mod error;
mod extractors;
mod handlers;
mod middleware;
mod models;
mod openapi;
mod reflection;
mod startup;
mod store;

use std::sync::Arc;

use async_openai::{config::OpenAIConfig, Client};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use auth::JwksCache;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;

use ai::{EntryAnalysisService, OpenAiAnalysisAdapter, OpenAiPromptAdapter};
use reflection::DailyPromptService;
use store::{EntryStore, PgEntryStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntryStore>,
    pub jwks_cache: Arc<JwksCache>,
    pub prompts: Arc<DailyPromptService>,
    pub analysis: Arc<dyn EntryAnalysisService>,
    pub config: AppConfig,
    pub metrics: Arc<MetricsState>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with conditional JSON/text output
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string()) == "json";

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,journely_api=debug,tower_http=debug".into());

    if use_json {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Human-readable for development
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    // Create database pool and bring the schema up to date
    let db = db::create_pool(&config.database_url).await.map_err(|e| {
        tracing::error!("Failed to create database pool: {}", e);
        e
    })?;

    db::run_migrations(&db).await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {}", e);
        e
    })?;

    tracing::info!("Database pool ready, migrations applied");

    // Initialize metrics recorder
    let metrics = Arc::new(handlers::setup_metrics_recorder());
    tracing::info!("Metrics recorder initialized");

    // JWKS cache for ID token validation
    let jwks_cache = Arc::new(JwksCache::new(config.auth_jwks_url.clone()));

    // One OpenAI client shared by both AI collaborators
    let openai_client =
        Client::with_config(OpenAIConfig::new().with_api_key(config.openai_api_key.clone()));

    let store: Arc<dyn EntryStore> = Arc::new(PgEntryStore::new(db));

    let prompt_adapter = Arc::new(OpenAiPromptAdapter::new(
        openai_client.clone(),
        config.prompt_model.clone(),
    ));
    let prompts = Arc::new(DailyPromptService::new(store.clone(), prompt_adapter));

    let analysis: Arc<dyn EntryAnalysisService> = Arc::new(OpenAiAnalysisAdapter::new(
        openai_client,
        config.analysis_model.clone(),
    ));

    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState {
        store,
        jwks_cache,
        prompts,
        analysis,
        config,
        metrics,
    });

    // Build router
    let app = startup::build_router(state);

    // Start server
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
