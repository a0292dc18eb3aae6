//! Axum route handlers for the Compatibility API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::admission::{ActionClass, Scope};
use crate::analysis::service::ServedAnalysis;
use crate::errors::AppError;
use crate::routes::identity::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InvalidateRequest {
    pub job_ids: Vec<String>,
}

/// POST /api/v1/jobs/:job_id/compatibility
pub async fn handle_analyze(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(job_id): Path<String>,
) -> Result<Json<ServedAnalysis>, AppError> {
    state
        .gate
        .admit(&Scope::Identity {
            user_id: user_id.clone(),
            action: ActionClass::Analyze,
        })
        .await?;

    let served = state.compatibility.analyze(&user_id, &job_id).await?;
    Ok(Json(served))
}

/// POST /api/v1/compatibility/invalidate
///
/// Called after the caller's profile changes. An empty `job_ids` list is a
/// 400; otherwise 204, even when the cache is unreachable.
pub async fn handle_invalidate(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(req): Json<InvalidateRequest>,
) -> Result<StatusCode, AppError> {
    if req.job_ids.is_empty() {
        return Err(AppError::Validation("job_ids cannot be empty".to_string()));
    }
    state.compatibility.invalidate(&user_id, &req.job_ids).await;
    Ok(StatusCode::NO_CONTENT)
}
