use std::sync::Arc;

use crate::admission::AdmissionGate;
use crate::analysis::service::CompatibilityService;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::records::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every collaborator is constructed in `main` and injected here; nothing is global.
#[derive(Clone)]
pub struct AppState {
    /// Rate Admission Gate shared by the IP middleware and the identity-scoped handlers.
    pub gate: Arc<AdmissionGate>,
    pub compatibility: Arc<CompatibilityService>,
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub records: Arc<dyn RecordStore>,
    /// Reverse proxies whose `x-forwarded-for` entries are trusted.
    pub trusted_proxy_hops: usize,
}
