// Cover-letter generation.
// Implements: validation, prompt building, text providers, assembly, batch fan-out.
// All Anthropic calls go through llm_client, no direct API calls here.

pub mod assembler;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod provider;
pub mod validation;
