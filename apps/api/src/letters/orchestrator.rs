//! Batch orchestration: runs one letter pipeline per application target.
//!
//! Flow per target: build_prompt → provider.generate → collect_text → assemble.
//!
//! Pipelines run as separate tokio tasks, at most `max_concurrency` at a time.
//! Results come back in input order regardless of completion order.
//! A task that dies is turned into a degraded letter for its own target.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{error, info, info_span, warn, Instrument};

use crate::errors::AppError;
use crate::letters::assembler::assemble;
use crate::letters::models::{ApplicantProfile, ApplicationTarget, GeneratedLetter, LetterStatus};
use crate::letters::prompts::build_prompt;
use crate::letters::provider::{collect_text, GenerationError, TextProvider};

/// Generates one letter per target.
///
/// Every failure inside a pipeline, including a panicking or cancelled task,
/// degrades the affected letter only. The returned list always has one
/// letter per target.
pub async fn run(
    provider: Arc<dyn TextProvider>,
    profile: Arc<ApplicantProfile>,
    targets: Vec<ApplicationTarget>,
    max_concurrency: usize,
) -> Result<Vec<GeneratedLetter>, AppError> {
    let total = targets.len();
    info!(
        "Generating {} letters with {} (max {} in flight)",
        total,
        provider.name(),
        max_concurrency
    );

    // `buffered` only pulls (and so spawns) the next target when a slot frees up.
    let joined: Vec<_> = stream::iter(targets.iter().cloned().enumerate())
        .map(|(index, target)| {
            let provider = Arc::clone(&provider);
            let profile = Arc::clone(&profile);
            let span = info_span!("letter", index, company = %target.company, role = %target.role);
            tokio::spawn(
                async move { generate_letter(provider.as_ref(), &profile, &target).await }
                    .instrument(span),
            )
        })
        .buffered(max_concurrency.max(1))
        .collect()
        .await;

    let letters: Vec<GeneratedLetter> = joined
        .into_iter()
        .zip(&targets)
        .enumerate()
        .map(|(index, (result, target))| match result {
            Ok(letter) => letter,
            Err(e) => {
                error!(
                    "Letter pipeline {index} for {} at {} died: {e}",
                    target.role, target.company
                );
                assemble(&profile, target, Err(GenerationError::Pipeline(e.to_string())))
            }
        })
        .collect();

    let failed = letters
        .iter()
        .filter(|l| l.status == LetterStatus::Failed)
        .count();
    info!("Batch complete: {} generated, {} degraded", total - failed, failed);

    Ok(letters)
}

async fn generate_letter(
    provider: &dyn TextProvider,
    profile: &ApplicantProfile,
    target: &ApplicationTarget,
) -> GeneratedLetter {
    let prompt = build_prompt(profile, target);

    let generated = match provider.generate(&prompt, profile, target).await {
        Ok(fragments) => collect_text(fragments).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &generated {
        warn!("Cover letter generation failed, degrading letter: {e}");
    }

    assemble(profile, target, generated)
}
