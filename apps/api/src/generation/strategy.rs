//! Generation strategies — the fixed set of prompt framings.
//!
//! Each strategy produces exactly one `ApplicationVariant` per request. The
//! instruction fragment is the only thing that differs between strategy prompts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    ImpactFocused,
    KeywordOptimized,
    Concise,
}

impl Strategy {
    /// Default order when a request names no strategies.
    pub const ALL: [Strategy; 3] = [
        Strategy::ImpactFocused,
        Strategy::KeywordOptimized,
        Strategy::Concise,
    ];

    /// Wire identifier, also stored with persisted variants.
    pub fn id(self) -> &'static str {
        match self {
            Strategy::ImpactFocused => "impact-focused",
            Strategy::KeywordOptimized => "keyword-optimized",
            Strategy::Concise => "concise",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::ImpactFocused => "Impact-Focused",
            Strategy::KeywordOptimized => "Keyword-Optimized",
            Strategy::Concise => "Concise",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Strategy::ImpactFocused => {
                "Lead every bullet with a measurable outcome. Favour numbers, scale and \
                 business results over responsibilities. Open the cover letter with the \
                 single most impressive relevant achievement."
            }
            Strategy::KeywordOptimized => {
                "Mirror the job posting's terminology wherever the profile supports it, so \
                 applicant tracking systems match the resume. Put the posting's required \
                 skills first in the skill list. Never add a skill the profile does not list."
            }
            Strategy::Concise => {
                "Keep it short. A two-sentence summary, at most three bullets per role, and a \
                 cover letter under 200 words. Cut anything not relevant to this posting."
            }
        }
    }
}

/// Collapses duplicates keeping first occurrence. Empty or absent means all strategies.
pub fn resolve_requested(requested: Option<&[Strategy]>) -> Vec<Strategy> {
    let requested = match requested {
        Some(list) if !list.is_empty() => list,
        _ => return Strategy::ALL.to_vec(),
    };
    let mut seen = HashSet::new();
    requested
        .iter()
        .copied()
        .filter(|s| seen.insert(*s))
        .collect()
}
