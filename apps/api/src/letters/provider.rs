//! Text providers: pluggable, trait-based sources of cover-letter text.
//!
//! Default: `AnthropicProvider` (remote streaming via `llm_client`).
//! Fallback: `TemplateProvider` (static template, no network, deterministic).
//!
//! `AppState` holds an `Arc<dyn TextProvider>`, chosen at startup via `TEXT_PROVIDER`.

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use thiserror::Error;

use crate::letters::models::{ApplicantProfile, ApplicationTarget};
use crate::letters::prompts::{fill_template, LETTER_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

/// Failure to produce text for one application target.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Llm(#[from] LlmError),

    #[error("text provider returned no content")]
    EmptyOutput,

    /// The pipeline task panicked or was cancelled before finishing.
    #[error("letter pipeline failed: {0}")]
    Pipeline(String),
}

/// Stream of text fragments from a provider. Must be drained fully before use.
pub type LetterStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send>>;

/// The text provider trait. Implement this to swap backends without touching
/// the orchestrator or handler.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short backend name, reported by `/health`.
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        prompt: &str,
        profile: &ApplicantProfile,
        target: &ApplicationTarget,
    ) -> Result<LetterStream, GenerationError>;
}

/// Drains a provider stream into one string.
///
/// Stops at the first failed fragment. Whitespace-only output counts as a failure.
pub async fn collect_text(mut stream: LetterStream) -> Result<String, GenerationError> {
    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        text.push_str(&fragment?);
    }

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyOutput);
    }
    Ok(text)
}

// ────────────────────────────────────────────────────────────────────────────
// AnthropicProvider
// ────────────────────────────────────────────────────────────────────────────

pub struct AnthropicProvider {
    llm: LlmClient,
}

impl AnthropicProvider {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TextProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn generate(
        &self,
        prompt: &str,
        _profile: &ApplicantProfile,
        _target: &ApplicationTarget,
    ) -> Result<LetterStream, GenerationError> {
        let fragments = self.llm.stream(prompt, LETTER_SYSTEM).await?;
        Ok(Box::pin(fragments.map(|r| r.map_err(GenerationError::from))))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TemplateProvider
// ────────────────────────────────────────────────────────────────────────────

/// Static cover-letter template. Replace: {hiring_manager}, {company}, {role}, {full_name}
const TEMPLATE_LETTER: &str = "Dear {hiring_manager},

I am writing to express my interest in the {role} position at {company}. With my background in software development and passion for creating user-centered applications, I am excited about the opportunity to contribute to your team.

I believe this experience aligns well with the goals of {company} and the requirements of the {role} role. I would welcome the opportunity to further discuss how my skills and experiences can benefit {company}. Thank you for considering my application.

Sincerely,
{full_name}";

/// Fills a fixed template and streams it line by line. Ignores the prompt.
pub struct TemplateProvider;

impl TemplateProvider {
    pub fn render(profile: &ApplicantProfile, target: &ApplicationTarget) -> String {
        fill_template(
            TEMPLATE_LETTER,
            &[
                ("hiring_manager", target.resolved_hiring_manager()),
                ("full_name", &profile.full_name),
                ("company", &target.company),
                ("role", &target.role),
            ],
        )
    }
}

#[async_trait]
impl TextProvider for TemplateProvider {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate(
        &self,
        _prompt: &str,
        profile: &ApplicantProfile,
        target: &ApplicationTarget,
    ) -> Result<LetterStream, GenerationError> {
        let letter = Self::render(profile, target);
        let lines: Vec<Result<String, GenerationError>> = letter
            .split_inclusive('\n')
            .map(|line| Ok(line.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(lines)))
    }
}
