// All LLM prompt constants for compatibility analysis.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for compatibility analysis.
pub const ANALYSIS_SYSTEM: &str = "You are an experienced technical recruiter scoring how well \
    a candidate fits a specific job. Be candid: inflated scores hurt the candidate. \
    Score only what the profile and posting actually say.";

/// Analysis prompt template.
/// Replace: {json_rules}, {profile}, {job_header}, {job_description}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"{json_rules}

Score the candidate against the job on each dimension from 1 (very poor) to 10 (excellent),
with a one-sentence justification each.

Return a JSON object with this EXACT schema (no extra fields):
{
  "dimensions": {
    "skill_match": {"score": 8, "justification": "..."},
    "experience_level": {"score": 7, "justification": "..."},
    "role_alignment": {"score": 7, "justification": "..."},
    "industry_match": {"score": 6, "justification": "..."},
    "location_fit": {"score": 9, "justification": "..."},
    "salary_alignment": {"score": 5, "justification": "..."},
    "culture_fit": {"score": 6, "justification": "..."},
    "growth_potential": {"score": 7, "justification": "..."},
    "education_match": {"score": 8, "justification": "..."},
    "company_stability": {"score": 6, "justification": "..."}
  },
  "strengths": ["short phrase", "..."],
  "gaps": ["short phrase", "..."],
  "red_flags": ["short phrase", "..."]
}

RULES:
1. Every dimension MUST be present with an integer score 1–10
2. At most 5 strengths, 5 gaps and 5 red flags, each under 200 characters
3. Red flags are deal-breakers only (e.g. missing mandatory licence, location impossible); use [] if none
4. Do NOT compute an overall score — it is derived from the dimensions

CANDIDATE PROFILE:
{profile}

JOB POSTING:
{job_header}
Description:
{job_description}"#;
