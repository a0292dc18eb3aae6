use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::generation::strategy::Strategy;
use crate::llm_client::LlmError;

// ────────────────────────────────────────────────────────────────────────────
// Variant content
// ────────────────────────────────────────────────────────────────────────────

/// Structured resume body. Also the shape the model is asked to return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeContent {
    pub summary: String,
    #[serde(default)]
    pub experience: Vec<ResumeExperience>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<ResumeEducation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeExperience {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeEducation {
    pub degree: String,
    pub school: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<String>,
}

/// One generated application: resume, cover letter and why it was framed this way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationVariant {
    pub id: Uuid,
    pub strategy: Strategy,
    pub strategy_name: &'static str,
    pub resume: ResumeContent,
    pub cover_letter: String,
    pub rationale: Vec<String>,
}

impl ApplicationVariant {
    pub fn new(
        strategy: Strategy,
        resume: ResumeContent,
        cover_letter: String,
        rationale: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            strategy,
            strategy_name: strategy.name(),
            resume,
            cover_letter,
            rationale,
        }
    }
}

/// Wire shape of a model reply for one strategy.
#[derive(Debug, Deserialize)]
pub struct GeneratedContent {
    pub resume: ResumeContent,
    pub cover_letter: String,
    #[serde(default)]
    pub rationale: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Failure
// ────────────────────────────────────────────────────────────────────────────

/// Why one strategy's model call produced nothing usable.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("gateway call failed: {0}")]
    Gateway(#[from] LlmError),

    #[error("model reply unusable: {0}")]
    Incomplete(&'static str),
}
