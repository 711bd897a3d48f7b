mod config;
mod db;
mod errors;
mod evaluation;
mod llm_client;
mod metrics;
mod models;
mod month;
mod projects;
mod resources;
mod routes;
mod state;
mod store;
mod worklogs;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryPlanningStore, PgPlanningStore, PlanningStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Planner API v{}", env!("CARGO_PKG_VERSION"));

    // Planning store: Postgres when configured, seeded memory otherwise
    let store: Arc<dyn PlanningStore> = match &config.database_url {
        Some(url) => Arc::new(PgPlanningStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; using the in-memory store with seed data");
            Arc::new(MemoryPlanningStore::seeded())
        }
    };

    // Initialize LLM client
    let mut llm = LlmClient::new(config.gemini_api_key.clone())?;
    if let Some(base) = &config.gemini_api_base {
        llm = llm.with_base_url(base.clone());
    }
    info!(
        "LLM client initialized (models: {}, {})",
        llm_client::FAST_MODEL,
        llm_client::REPORT_MODEL
    );

    let state = AppState {
        store,
        llm,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
