//! Compatibility Analyzer — pluggable, trait-based scorer for (profile, job) pairs.
//!
//! Default: `LlmAnalyzer` (model-backed, one gateway call, strict JSON schema).
//! `HeuristicAnalyzer` is the deterministic fallback used when the model fails.
//!
//! The service holds an `Arc<dyn Analyzer>`, so tests can swap in scripted backends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::analysis::heuristic;
use crate::analysis::models::{CompatibilityAnalysis, DimensionScore, Dimensions};
use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::llm_client::budget::truncate_to_tokens;
use crate::llm_client::prompts::{render, JSON_ONLY_RULES};
use crate::llm_client::{parse_json, CompletionGateway, CompletionRequest, LlmError};
use crate::models::{CandidateProfile, JobPosting};

pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);
const ANALYSIS_TEMPERATURE: f32 = 0.3;
const ANALYSIS_MAX_TOKENS: u32 = 2000;
const PROFILE_TOKEN_BUDGET: usize = 2000;
const JOB_DESCRIPTION_TOKEN_BUDGET: usize = 1500;

#[derive(Debug, Error)]
pub enum AnalysisFailure {
    #[error("analysis call timed out after {0:?}")]
    Timeout(Duration),

    #[error("analysis call failed: {0}")]
    Gateway(#[from] LlmError),
}

/// Where an analysis came from. Only model results are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    Model,
    Heuristic,
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        profile: &CandidateProfile,
        job: &JobPosting,
    ) -> Result<CompatibilityAnalysis, AnalysisFailure>;

    fn source(&self) -> AnalysisSource;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmAnalyzer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmAnalyzer {
    gateway: Arc<dyn CompletionGateway>,
    timeout: Duration,
}

impl LlmAnalyzer {
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self {
            gateway,
            timeout: ANALYSIS_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze(
        &self,
        profile: &CandidateProfile,
        job: &JobPosting,
    ) -> Result<CompatibilityAnalysis, AnalysisFailure> {
        let request = CompletionRequest {
            system: ANALYSIS_SYSTEM.to_string(),
            prompt: build_analysis_prompt(profile, job),
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: ANALYSIS_MAX_TOKENS,
        };

        let text = tokio::time::timeout(self.timeout, self.gateway.complete(&request))
            .await
            .map_err(|_| AnalysisFailure::Timeout(self.timeout))??;

        let raw: ModelAnalysis = parse_json(&text)?;
        debug!(
            "Model analysis parsed for candidate {} / job {}",
            profile.candidate_id, job.job_id
        );
        Ok(raw.into_analysis())
    }

    fn source(&self) -> AnalysisSource {
        AnalysisSource::Model
    }
}

/// Wire shape of the model's reply. Scores arrive as JSON numbers of any kind.
#[derive(Debug, Deserialize)]
struct ModelAnalysis {
    dimensions: ModelDimensions,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    gaps: Vec<String>,
    #[serde(default)]
    red_flags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ModelDimension {
    score: f64,
    #[serde(default)]
    justification: String,
}

#[derive(Debug, Deserialize)]
struct ModelDimensions {
    skill_match: ModelDimension,
    experience_level: ModelDimension,
    role_alignment: ModelDimension,
    industry_match: ModelDimension,
    location_fit: ModelDimension,
    salary_alignment: ModelDimension,
    culture_fit: ModelDimension,
    growth_potential: ModelDimension,
    education_match: ModelDimension,
    company_stability: ModelDimension,
}

impl ModelDimension {
    fn into_score(self) -> DimensionScore {
        let score = if self.score.is_finite() {
            self.score.round().clamp(1.0, 10.0) as u8
        } else {
            1
        };
        DimensionScore::new(score, self.justification)
    }
}

impl ModelAnalysis {
    fn into_analysis(self) -> CompatibilityAnalysis {
        let d = self.dimensions;
        let dimensions = Dimensions {
            skill_match: d.skill_match.into_score(),
            experience_level: d.experience_level.into_score(),
            role_alignment: d.role_alignment.into_score(),
            industry_match: d.industry_match.into_score(),
            location_fit: d.location_fit.into_score(),
            salary_alignment: d.salary_alignment.into_score(),
            culture_fit: d.culture_fit.into_score(),
            growth_potential: d.growth_potential.into_score(),
            education_match: d.education_match.into_score(),
            company_stability: d.company_stability.into_score(),
        };
        CompatibilityAnalysis::new(dimensions, self.strengths, self.gaps, self.red_flags)
    }
}

fn build_analysis_prompt(profile: &CandidateProfile, job: &JobPosting) -> String {
    let profile_text = truncate_to_tokens(&profile.to_prompt_text(), PROFILE_TOKEN_BUDGET);
    let job_description = truncate_to_tokens(&job.description, JOB_DESCRIPTION_TOKEN_BUDGET);
    render(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("json_rules", JSON_ONLY_RULES),
            ("profile", &profile_text),
            ("job_header", &job.header_text()),
            ("job_description", &job_description),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicAnalyzer
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic analyzer. Never fails.
pub struct HeuristicAnalyzer;

#[async_trait]
impl Analyzer for HeuristicAnalyzer {
    async fn analyze(
        &self,
        profile: &CandidateProfile,
        job: &JobPosting,
    ) -> Result<CompatibilityAnalysis, AnalysisFailure> {
        Ok(heuristic::analyze(profile, job))
    }

    fn source(&self) -> AnalysisSource {
        AnalysisSource::Heuristic
    }
}
