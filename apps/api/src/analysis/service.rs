//! `analyzeCompatibility` flow: cache get → load profile + job → analyze → cache put.
//!
//! The primary analyzer is model-backed. When it fails the heuristic result is
//! returned instead, and is not cached so the next request retries the model.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::analyzer::{AnalysisSource, Analyzer, HeuristicAnalyzer};
use crate::analysis::cache::CompatibilityCache;
use crate::analysis::models::CompatibilityAnalysis;
use crate::errors::AppError;
use crate::models::{CandidateProfile, JobPosting};
use crate::records::{bounded, RecordStore};

/// Where a returned analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOrigin {
    Cache,
    Model,
    Heuristic,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServedAnalysis {
    pub analysis: CompatibilityAnalysis,
    pub origin: AnalysisOrigin,
}

pub struct CompatibilityService {
    records: Arc<dyn RecordStore>,
    cache: CompatibilityCache,
    primary: Arc<dyn Analyzer>,
    fallback: HeuristicAnalyzer,
}

impl CompatibilityService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        cache: CompatibilityCache,
        primary: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            records,
            cache,
            primary,
            fallback: HeuristicAnalyzer,
        }
    }

    pub async fn analyze(
        &self,
        candidate_id: &str,
        job_id: &str,
    ) -> Result<ServedAnalysis, AppError> {
        if let Some(entry) = self.cache.get(candidate_id, job_id).await {
            debug!(
                "Serving cached analysis from {:?} tier (cached {}, expires {})",
                entry.source_tier, entry.cached_at, entry.expires_at
            );
            return Ok(ServedAnalysis {
                analysis: entry.analysis,
                origin: AnalysisOrigin::Cache,
            });
        }

        let (profile, job) = load_pair(self.records.as_ref(), candidate_id, job_id).await?;

        let (analysis, source) = match self.primary.analyze(&profile, &job).await {
            Ok(analysis) => (analysis, self.primary.source()),
            Err(e) => {
                warn!(
                    "Compatibility analysis failed for candidate {candidate_id} / job {job_id}, \
                     using heuristic: {e}"
                );
                let analysis = match self.fallback.analyze(&profile, &job).await {
                    Ok(analysis) => analysis,
                    Err(e) => return Err(AppError::Internal(e.into())),
                };
                (analysis, AnalysisSource::Heuristic)
            }
        };

        info!(
            "Compatibility for candidate {candidate_id} / job {job_id}: {} ({})",
            analysis.overall_score(),
            analysis.recommendation().as_str()
        );

        let origin = match source {
            AnalysisSource::Model => {
                // The audit row is written in the background.
                let _audit = self.cache.put(candidate_id, job_id, &analysis).await;
                AnalysisOrigin::Model
            }
            AnalysisSource::Heuristic => AnalysisOrigin::Heuristic,
        };

        Ok(ServedAnalysis { analysis, origin })
    }

    pub async fn invalidate(&self, candidate_id: &str, job_ids: &[String]) {
        self.cache.invalidate(candidate_id, job_ids).await;
    }
}

/// Loads the profile and posting, mapping absence to `NotFound`.
/// Each load is bounded by `RECORD_TIMEOUT`.
pub async fn load_pair(
    records: &dyn RecordStore,
    candidate_id: &str,
    job_id: &str,
) -> Result<(CandidateProfile, JobPosting), AppError> {
    let (profile, job) = tokio::try_join!(
        bounded(records.load_profile(candidate_id)),
        bounded(records.load_job(job_id))
    )?;
    let profile = profile
        .ok_or_else(|| AppError::NotFound(format!("Profile for {candidate_id} not found")))?;
    let job = job.ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok((profile, job))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::LlmAnalyzer;
    use crate::store::memory::MemoryStore;
    use crate::records::{RecordError, RECORD_TIMEOUT};
    use crate::testing::{settle, MemoryRecordStore, ScriptedGateway};
    use std::time::Duration;

    const MODEL_REPLY: &str = r#"{
        "dimensions": {
            "skill_match": {"score": 9, "justification": "a"},
            "experience_level": {"score": 9, "justification": "b"},
            "role_alignment": {"score": 9, "justification": "c"},
            "industry_match": {"score": 9, "justification": "d"},
            "location_fit": {"score": 9, "justification": "e"},
            "salary_alignment": {"score": 9, "justification": "f"},
            "culture_fit": {"score": 9, "justification": "g"},
            "growth_potential": {"score": 9, "justification": "h"},
            "education_match": {"score": 9, "justification": "i"},
            "company_stability": {"score": 9, "justification": "j"}
        },
        "strengths": ["Rust"],
        "gaps": [],
        "red_flags": []
    }"#;

    struct Fixture {
        service: CompatibilityService,
        gateway: Arc<ScriptedGateway>,
        records: Arc<MemoryRecordStore>,
    }

    fn fixture(gateway: ScriptedGateway) -> Fixture {
        let gateway = Arc::new(gateway);
        let records = Arc::new(MemoryRecordStore::seeded());
        let cache = CompatibilityCache::new(Arc::new(MemoryStore::new()), records.clone());
        let service = CompatibilityService::new(
            records.clone(),
            cache,
            Arc::new(LlmAnalyzer::new(gateway.clone())),
        );
        Fixture {
            service,
            gateway,
            records,
        }
    }

    #[tokio::test]
    async fn test_model_result_is_cached() {
        let f = fixture(ScriptedGateway::replying(MODEL_REPLY));

        let first = f.service.analyze("cand-1", "job-1").await.unwrap();
        assert_eq!(first.origin, AnalysisOrigin::Model);
        assert_eq!(first.analysis.overall_score(), 90);

        let second = f.service.analyze("cand-1", "job-1").await.unwrap();
        assert_eq!(second.origin, AnalysisOrigin::Cache);
        assert_eq!(second.analysis, first.analysis);

        assert_eq!(f.gateway.calls(), 1);
        settle().await;
        assert_eq!(f.records.audit_rows().len(), 1);
    }

    #[tokio::test]
    async fn test_heuristic_result_is_returned_but_not_cached() {
        let f = fixture(ScriptedGateway::failing());

        let first = f.service.analyze("cand-1", "job-1").await.unwrap();
        assert_eq!(first.origin, AnalysisOrigin::Heuristic);
        let second = f.service.analyze("cand-1", "job-1").await.unwrap();
        assert_eq!(second.origin, AnalysisOrigin::Heuristic);

        assert_eq!(f.gateway.calls(), 2);
        settle().await;
        assert!(f.records.audit_rows().is_empty());
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let f = fixture(ScriptedGateway::replying(MODEL_REPLY));

        let missing_job = f.service.analyze("cand-1", "job-404").await;
        assert!(matches!(missing_job, Err(AppError::NotFound(_))));

        let missing_profile = f.service.analyze("nobody", "job-1").await;
        assert!(matches!(missing_profile, Err(AppError::NotFound(_))));
        assert_eq!(f.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_forces_a_fresh_analysis() {
        let f = fixture(ScriptedGateway::replying(MODEL_REPLY));
        f.service.analyze("cand-1", "job-1").await.unwrap();

        f.service
            .invalidate("cand-1", &["job-1".to_string()])
            .await;
        let again = f.service.analyze("cand-1", "job-1").await.unwrap();

        assert_eq!(again.origin, AnalysisOrigin::Model);
        assert_eq!(f.gateway.calls(), 2);
        settle().await;
        assert_eq!(f.records.audit_rows().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_audit_write_does_not_delay_the_response() {
        let f = fixture(ScriptedGateway::replying(MODEL_REPLY));
        f.records.set_writes_hanging(true);

        let served = tokio::time::timeout(
            Duration::from_secs(1),
            f.service.analyze("cand-1", "job-1"),
        )
        .await
        .expect("analysis should not wait on the audit ledger")
        .unwrap();
        assert_eq!(served.origin, AnalysisOrigin::Model);

        let again = f.service.analyze("cand-1", "job-1").await.unwrap();
        assert_eq!(again.origin, AnalysisOrigin::Cache);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_record_store_times_out() {
        let f = fixture(ScriptedGateway::replying(MODEL_REPLY));
        f.records.set_reads_hanging(true);

        let result = f.service.analyze("cand-1", "job-1").await;
        assert!(matches!(
            result,
            Err(AppError::Records(RecordError::Timeout(t))) if t == RECORD_TIMEOUT
        ));
        assert_eq!(f.gateway.calls(), 0);
    }
}
