//! Test doubles shared across module tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::admission::{AdmissionGate, RateLimits};
use crate::analysis::analyzer::LlmAnalyzer;
use crate::analysis::cache::CompatibilityCache;
use crate::analysis::models::CompatibilityAnalysis;
use crate::analysis::service::CompatibilityService;
use crate::generation::models::ApplicationVariant;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::llm_client::{CompletionGateway, CompletionRequest, LlmError};
use crate::models::{CandidateProfile, Education, JobPosting, WorkExperience};
use crate::records::{AnalysisLedger, RecordError, RecordStore};
use crate::state::AppState;
use crate::store::memory::MemoryStore;

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

/// Two roles, three skills, one degree.
pub fn sample_profile() -> CandidateProfile {
    CandidateProfile {
        candidate_id: "cand-1".to_string(),
        full_name: "Sam Rivera".to_string(),
        email: Some("sam@example.com".to_string()),
        headline: Some("Backend Engineer".to_string()),
        summary: Some("Backend engineer building reliable data services.".to_string()),
        location: Some("Austin, TX".to_string()),
        years_experience: Some(6),
        skills: vec![
            "Rust".to_string(),
            "PostgreSQL".to_string(),
            "Kubernetes".to_string(),
        ],
        experience: vec![
            WorkExperience {
                title: "Backend Engineer".to_string(),
                company: "Acme".to_string(),
                location: Some("Austin, TX".to_string()),
                start_date: Some("2021-03".to_string()),
                end_date: None,
                description: Some("Owns the billing services.".to_string()),
                accomplishments: vec![
                    "Cut invoice generation time from 40 minutes to 3".to_string(),
                    "Migrated billing to Rust with zero downtime".to_string(),
                ],
            },
            WorkExperience {
                title: "Software Engineer".to_string(),
                company: "Globex".to_string(),
                location: None,
                start_date: Some("2018-06".to_string()),
                end_date: Some("2021-02".to_string()),
                description: Some("Built internal APIs on PostgreSQL.".to_string()),
                accomplishments: vec![],
            },
        ],
        education: vec![Education {
            degree: "BSc".to_string(),
            field: Some("Computer Science".to_string()),
            school: "UT Austin".to_string(),
            graduation_year: Some("2018".to_string()),
        }],
    }
}

/// Posting with a 500-character description.
pub fn sample_job() -> JobPosting {
    let base = "Initech is hiring a senior backend engineer to design and run the Rust \
                services behind our payments platform. You will own PostgreSQL schemas, \
                operate workloads on Kubernetes and mentor engineers. ";
    JobPosting {
        job_id: "job-1".to_string(),
        title: "Senior Backend Engineer".to_string(),
        company: "Initech".to_string(),
        location: Some("Remote (US)".to_string()),
        job_type: Some("Full-time".to_string()),
        salary_min: Some(150_000),
        salary_max: Some(185_000),
        description: base.chars().cycle().take(500).collect(),
        required_skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ScriptedGateway
// ────────────────────────────────────────────────────────────────────────────

enum Unmatched {
    Reply(String),
    Fail,
    Hang,
}

/// Gateway double. Rules match on a prompt substring; otherwise the default applies.
pub struct ScriptedGateway {
    default: Unmatched,
    rules: Vec<(String, String)>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    fn with_default(default: Unmatched) -> Self {
        Self {
            default,
            rules: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::with_default(Unmatched::Reply(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::with_default(Unmatched::Fail)
    }

    /// Never answers. Pair with a timeout and a paused clock.
    pub fn hanging() -> Self {
        Self::with_default(Unmatched::Hang)
    }

    pub fn when(mut self, prompt_contains: &str, reply: &str) -> Self {
        self.rules
            .push((prompt_contains.to_string(), reply.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some((_, reply)) = self
            .rules
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
        {
            return Ok(reply.clone());
        }

        match &self.default {
            Unmatched::Reply(text) => Ok(text.clone()),
            Unmatched::Fail => Err(LlmError::RateLimited {
                message: "scripted failure".to_string(),
            }),
            Unmatched::Hang => std::future::pending().await,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryRecordStore
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryRecordStore {
    profiles: Mutex<HashMap<String, CandidateProfile>>,
    jobs: Mutex<HashMap<String, JobPosting>>,
    audit: Mutex<Vec<(String, String, CompatibilityAnalysis)>>,
    variants: Mutex<Vec<(String, String, ApplicationVariant)>>,
    audit_attempts: AtomicUsize,
    audit_failures_left: AtomicU32,
    fail_variants: AtomicBool,
    hang_reads: AtomicBool,
    hang_writes: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `sample_profile()` and `sample_job()`.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.insert_profile(sample_profile());
        store.insert_job(sample_job());
        store
    }

    pub fn insert_profile(&self, profile: CandidateProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.candidate_id.clone(), profile);
    }

    pub fn insert_job(&self, job: JobPosting) {
        self.jobs.lock().unwrap().insert(job.job_id.clone(), job);
    }

    pub fn fail_next_audit_writes(&self, count: u32) {
        self.audit_failures_left.store(count, Ordering::SeqCst);
    }

    pub fn set_variant_writes_failing(&self, failing: bool) {
        self.fail_variants.store(failing, Ordering::SeqCst);
    }

    /// Profile and job loads never resolve.
    pub fn set_reads_hanging(&self, hanging: bool) {
        self.hang_reads.store(hanging, Ordering::SeqCst);
    }

    /// Variant and audit writes never resolve.
    pub fn set_writes_hanging(&self, hanging: bool) {
        self.hang_writes.store(hanging, Ordering::SeqCst);
    }

    async fn stall_if(&self, flag: &AtomicBool) {
        if flag.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }

    pub fn audit_attempts(&self) -> usize {
        self.audit_attempts.load(Ordering::SeqCst)
    }

    pub fn audit_rows(&self) -> Vec<(String, String, CompatibilityAnalysis)> {
        self.audit.lock().unwrap().clone()
    }

    pub fn saved_variants(&self) -> Vec<(String, String, ApplicationVariant)> {
        self.variants.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load_profile(
        &self,
        candidate_id: &str,
    ) -> Result<Option<CandidateProfile>, RecordError> {
        self.stall_if(&self.hang_reads).await;
        Ok(self.profiles.lock().unwrap().get(candidate_id).cloned())
    }

    async fn load_job(&self, job_id: &str) -> Result<Option<JobPosting>, RecordError> {
        self.stall_if(&self.hang_reads).await;
        Ok(self.jobs.lock().unwrap().get(job_id).cloned())
    }

    async fn save_variants(
        &self,
        candidate_id: &str,
        job_id: &str,
        variants: &[ApplicationVariant],
    ) -> Result<(), RecordError> {
        self.stall_if(&self.hang_writes).await;
        if self.fail_variants.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        let mut stored = self.variants.lock().unwrap();
        for variant in variants {
            stored.push((candidate_id.to_string(), job_id.to_string(), variant.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl AnalysisLedger for MemoryRecordStore {
    async fn append_analysis(
        &self,
        candidate_id: &str,
        job_id: &str,
        analysis: &CompatibilityAnalysis,
    ) -> Result<(), RecordError> {
        self.audit_attempts.fetch_add(1, Ordering::SeqCst);
        self.stall_if(&self.hang_writes).await;
        let failing = self
            .audit_failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        self.audit.lock().unwrap().push((
            candidate_id.to_string(),
            job_id.to_string(),
            analysis.clone(),
        ));
        Ok(())
    }
}

/// Lets spawned background work (audit writes) run to completion on the
/// current-thread test runtime.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AppState
// ────────────────────────────────────────────────────────────────────────────

/// Fully wired state over in-memory stores and the given gateway.
pub fn test_state(
    gateway: ScriptedGateway,
    limits: RateLimits,
) -> (AppState, Arc<MemoryRecordStore>) {
    let gateway = Arc::new(gateway);
    let kv = Arc::new(MemoryStore::new());
    let records = Arc::new(MemoryRecordStore::seeded());

    let cache = CompatibilityCache::new(kv.clone(), records.clone());
    let compatibility = CompatibilityService::new(
        records.clone(),
        cache,
        Arc::new(LlmAnalyzer::new(gateway.clone())),
    );

    let state = AppState {
        gate: Arc::new(AdmissionGate::new(kv, limits)),
        compatibility: Arc::new(compatibility),
        orchestrator: Arc::new(GenerationOrchestrator::new(gateway)),
        records: records.clone(),
        trusted_proxy_hops: 0,
    };
    (state, records)
}
