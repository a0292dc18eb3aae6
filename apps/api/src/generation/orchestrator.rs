//! Generation Orchestrator — one concurrent model call per requested strategy.
//!
//! Flow per strategy: build prompt (budgeted profile + job description + strategy
//! instruction) → gateway call under a 60s deadline → parse structured content.
//! Each strategy yields `Result<ApplicationVariant, GenerationFailure>`; the
//! `resolve` step turns every failure into a deterministic fallback variant.
//!
//! The output always has exactly one variant per strategy, in request order.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::generation::fallback::synthesize_fallback;
use crate::generation::models::{ApplicationVariant, GeneratedContent, GenerationFailure};
use crate::generation::prompts::{GENERATION_PROMPT_TEMPLATE, GENERATION_SYSTEM};
use crate::generation::strategy::Strategy;
use crate::llm_client::budget::{estimate_tokens, truncate_to_tokens};
use crate::llm_client::prompts::{render, GROUNDING_INSTRUCTION, JSON_ONLY_RULES};
use crate::llm_client::{parse_json, CompletionGateway, CompletionRequest};
use crate::models::{CandidateProfile, JobPosting};

pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
const GENERATION_TEMPERATURE: f32 = 0.7;
const GENERATION_MAX_TOKENS: u32 = 3000;
const PROFILE_TOKEN_BUDGET: usize = 2000;
const JOB_DESCRIPTION_TOKEN_BUDGET: usize = 1500;

pub struct GenerationOrchestrator {
    gateway: Arc<dyn CompletionGateway>,
    timeout: Duration,
}

impl GenerationOrchestrator {
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self {
            gateway,
            timeout: GENERATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generates one variant per strategy. `strategies` must already be deduplicated.
    pub async fn generate(
        &self,
        profile: &CandidateProfile,
        job: &JobPosting,
        strategies: &[Strategy],
    ) -> Vec<ApplicationVariant> {
        // Budgeting is strategy-independent, so do it once.
        let profile_text = truncate_to_tokens(&profile.to_prompt_text(), PROFILE_TOKEN_BUDGET);
        let job_description = truncate_to_tokens(&job.description, JOB_DESCRIPTION_TOKEN_BUDGET);
        let job_header = job.header_text();

        let outcomes = join_all(strategies.iter().map(|&strategy| {
            let prompt =
                build_generation_prompt(strategy, &profile_text, &job_header, &job_description);
            self.run_strategy(strategy, prompt)
        }))
        .await;

        let variants: Vec<ApplicationVariant> = strategies
            .iter()
            .zip(outcomes)
            .map(|(&strategy, outcome)| resolve(strategy, outcome, profile, job))
            .collect();

        info!(
            "Generated {} variants for candidate {} / job {}",
            variants.len(),
            profile.candidate_id,
            job.job_id
        );
        variants
    }

    async fn run_strategy(
        &self,
        strategy: Strategy,
        prompt: String,
    ) -> Result<ApplicationVariant, GenerationFailure> {
        debug!(
            "Strategy {} prompt is ~{} tokens",
            strategy.id(),
            estimate_tokens(&prompt)
        );
        let request = CompletionRequest {
            system: GENERATION_SYSTEM.to_string(),
            prompt,
            temperature: GENERATION_TEMPERATURE,
            max_tokens: GENERATION_MAX_TOKENS,
        };

        let text = tokio::time::timeout(self.timeout, self.gateway.complete(&request))
            .await
            .map_err(|_| GenerationFailure::Timeout(self.timeout))??;

        let content: GeneratedContent = parse_json(&text)?;
        if content.resume.summary.trim().is_empty() {
            return Err(GenerationFailure::Incomplete("empty summary"));
        }
        if content.cover_letter.trim().is_empty() {
            return Err(GenerationFailure::Incomplete("empty cover letter"));
        }

        Ok(ApplicationVariant::new(
            strategy,
            content.resume,
            content.cover_letter,
            content.rationale,
        ))
    }
}

/// Fallback-synthesis step: a failed strategy becomes a profile-only variant.
fn resolve(
    strategy: Strategy,
    outcome: Result<ApplicationVariant, GenerationFailure>,
    profile: &CandidateProfile,
    job: &JobPosting,
) -> ApplicationVariant {
    match outcome {
        Ok(variant) => variant,
        Err(e) => {
            warn!(
                "Strategy {} failed for candidate {} / job {}, using fallback: {e}",
                strategy.id(),
                profile.candidate_id,
                job.job_id
            );
            synthesize_fallback(strategy, profile, job)
        }
    }
}

fn build_generation_prompt(
    strategy: Strategy,
    profile_text: &str,
    job_header: &str,
    job_description: &str,
) -> String {
    render(
        GENERATION_PROMPT_TEMPLATE,
        &[
            ("json_rules", JSON_ONLY_RULES),
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("strategy_name", strategy.name()),
            ("strategy_instruction", strategy.instruction()),
            ("profile", profile_text),
            ("job_header", job_header),
            ("job_description", job_description),
        ],
    )
}
