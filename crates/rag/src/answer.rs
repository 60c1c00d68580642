//! Grounded answer generation.
//!
//! Assembles the context-only prompt from retrieved chunks and calls the
//! generation service. The refusal sentence emitted for insufficient
//! context is a successful answer, not an error; see
//! [`docqa_prompt::REFUSAL_SENTENCE`].

use crate::types::{GroundedAnswer, RetrievedChunk};
use docqa_core::config::GenerationSettings;
use docqa_core::AppResult;
use docqa_llm::{GenerationRequest, Generator};
use docqa_prompt::build_grounded_prompt;

/// Generate a grounded answer for `query` from the retrieved chunks.
///
/// Chunk texts are concatenated in retrieval order, separated by a blank
/// line; an empty retrieval yields an empty context and a still
/// well-formed prompt. The call is not retried on failure — the caller
/// decides retry policy.
pub async fn answer_grounded(
    generator: &dyn Generator,
    settings: &GenerationSettings,
    template: Option<&str>,
    query: &str,
    retrieved: &[RetrievedChunk],
) -> AppResult<GroundedAnswer> {
    let context = build_context(retrieved);
    let prompt = build_grounded_prompt(query, &context, template)?;

    let request = GenerationRequest::new(prompt.text, settings.model.clone())
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens);

    tracing::info!(
        "Generating answer via '{}' ({} context chars, {} chunks)",
        generator.provider_name(),
        context.len(),
        retrieved.len()
    );

    let response = generator.generate(&request).await?;

    Ok(GroundedAnswer {
        answer: response.content,
        context,
        chunks: retrieved.to_vec(),
    })
}

/// Concatenate chunk texts into the context string, blank-line separated.
fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
