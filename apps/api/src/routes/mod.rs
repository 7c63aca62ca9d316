pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analyses", post(handlers::handle_analyze))
        .route("/api/v1/analyses/ai", post(handlers::handle_analyze_ai))
        .route("/api/v1/roles", get(handlers::handle_list_roles))
        .route("/api/v1/stats", get(handlers::handle_stats))
        .with_state(state)
}
