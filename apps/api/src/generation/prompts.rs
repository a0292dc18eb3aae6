// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for application generation.
pub const GENERATION_SYSTEM: &str = "You are an expert resume writer and career coach. \
    You tailor a candidate's real history to one specific job posting. \
    You never invent experience, employers, dates or credentials.";

/// Application generation prompt template.
/// Replace: {json_rules}, {grounding_instruction}, {strategy_name},
///          {strategy_instruction}, {profile}, {job_header}, {job_description}
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"{json_rules}

{grounding_instruction}

STRATEGY: {strategy_name}
{strategy_instruction}

Write a tailored resume and cover letter for this candidate and job. Return a JSON object
with this EXACT schema (no extra fields):
{
  "resume": {
    "summary": "2-4 sentence professional summary",
    "experience": [
      {
        "title": "Senior Engineer",
        "company": "Acme",
        "location": "Remote",
        "start_date": "2021-03",
        "end_date": null,
        "bullets": ["Cut p99 latency 40% by ..."]
      }
    ],
    "skills": ["Rust", "PostgreSQL"],
    "education": [
      {"degree": "BSc", "field": "Computer Science", "school": "State University", "graduation_year": "2016"}
    ]
  },
  "cover_letter": "Full cover letter text, plain paragraphs separated by blank lines",
  "rationale": ["Why this framing suits the posting", "..."]
}

HARD RULES:
1. `experience` keeps the candidate's roles in the order given, with the exact titles, companies and dates
2. `end_date` is null for a current role
3. `skills` only contains skills from the profile
4. `rationale` has 2-4 short entries explaining the choices made for this strategy
5. The cover letter is addressed to the hiring team at the posting's company

CANDIDATE PROFILE:
{profile}

JOB POSTING:
{job_header}
Description:
{job_description}"#;
