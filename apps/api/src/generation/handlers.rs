//! Axum route handlers for the Generation API.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::admission::{ActionClass, Scope};
use crate::errors::AppError;
use crate::generation::generator::{generate_application, GenerateRequest, GenerateResponse};
use crate::routes::identity::AuthenticatedUser;
use crate::state::AppState;

/// POST /api/v1/jobs/:job_id/applications
///
/// One variant per requested strategy, in request order. Variants whose model
/// call failed carry the fallback marker in their rationale.
pub async fn handle_generate(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(job_id): Path<String>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    state
        .gate
        .admit(&Scope::Identity {
            user_id: user_id.clone(),
            action: ActionClass::Generate,
        })
        .await?;

    let response = generate_application(
        state.records.as_ref(),
        &state.orchestrator,
        &user_id,
        &job_id,
        &request,
    )
    .await?;

    Ok(Json(response))
}
