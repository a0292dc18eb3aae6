// Application Generation
// Implements: strategy framing, concurrent per-strategy generation, fallback synthesis.
// All LLM calls go through llm_client — no direct Anthropic SDK calls here.

pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod strategy;
