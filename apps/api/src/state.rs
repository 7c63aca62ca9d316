use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::ModelProvider;
use crate::models::role::RoleCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable model backend. Selected once at startup via AI_PROVIDER.
    pub provider: Arc<dyn ModelProvider>,
    pub roles: Arc<RoleCatalog>,
}
