// Compatibility Analysis
// Implements: 10-dimension weighted scoring, model-backed analyzer with heuristic
// fallback, and the two-tier (Redis + Postgres audit) cache in front of it.
// All LLM calls go through llm_client.

pub mod analyzer;
pub mod cache;
pub mod handlers;
pub mod heuristic;
pub mod models;
pub mod prompts;
pub mod service;
