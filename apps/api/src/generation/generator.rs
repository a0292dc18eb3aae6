//! Application Generation — the `generateApplication` pipeline.
//!
//! Flow: load profile + job → resolve strategies → orchestrator (concurrent,
//! with fallback) → hand variants to the record store → return.
//!
//! Only a missing profile or posting fails the request. Everything after that
//! degrades: model failures become fallback variants and a failed persistence
//! write is logged.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::service::load_pair;
use crate::errors::AppError;
use crate::generation::models::ApplicationVariant;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::generation::strategy::{resolve_requested, Strategy};
use crate::records::{bounded, RecordStore};

/// Request body for application generation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    /// Absent or empty means every strategy.
    pub strategies: Option<Vec<Strategy>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub job_id: String,
    pub variants: Vec<ApplicationVariant>,
}

pub async fn generate_application(
    records: &dyn RecordStore,
    orchestrator: &GenerationOrchestrator,
    candidate_id: &str,
    job_id: &str,
    request: &GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    let (profile, job) = load_pair(records, candidate_id, job_id).await?;

    let strategies = resolve_requested(request.strategies.as_deref());
    info!(
        "Generating {} variants for candidate {candidate_id} / job {job_id}",
        strategies.len()
    );

    let variants = orchestrator.generate(&profile, &job, &strategies).await;

    if let Err(e) = bounded(records.save_variants(candidate_id, job_id, &variants)).await {
        warn!("Failed to store variants for candidate {candidate_id} / job {job_id}: {e}");
    }

    Ok(GenerateResponse {
        job_id: job_id.to_string(),
        variants,
    })
}
