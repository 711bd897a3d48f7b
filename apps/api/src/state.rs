use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::store::PlanningStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, the seeded in-memory store when no database is configured.
    pub store: Arc<dyn PlanningStore>,
    pub llm: LlmClient,
    #[allow(dead_code)]
    pub config: Config,
}
