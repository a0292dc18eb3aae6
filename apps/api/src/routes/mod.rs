pub mod health;
pub mod identity;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::admission::middleware::limit_by_ip;
use crate::analysis::handlers as analysis;
use crate::generation::handlers as generation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Compatibility API
        .route(
            "/api/v1/jobs/:job_id/compatibility",
            post(analysis::handle_analyze),
        )
        .route(
            "/api/v1/compatibility/invalidate",
            post(analysis::handle_invalidate),
        )
        // Generation API
        .route(
            "/api/v1/jobs/:job_id/applications",
            post(generation::handle_generate),
        )
        .layer(middleware::from_fn_with_state(state.clone(), limit_by_ip))
        .with_state(state)
}
