//! The grounded question-answering prompt.

use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::HashMap;

/// The fixed refusal sentence the generation service must emit when the
/// context is insufficient.
///
/// The refusal is a successful, valid answer — not an error. Callers may
/// compare answer text against this constant as a convention check; it is
/// not a guarantee.
pub const REFUSAL_SENTENCE: &str = "The documents do not contain this information.";

/// Default grounded-answer template.
///
/// Placeholders: `{{context}}` (retrieved chunk texts) and `{{question}}`
/// (the user query). Both are substituted verbatim.
const DEFAULT_TEMPLATE: &str = "\
You are an assistant that must ONLY answer based on the provided context.
If the answer cannot be found in the context, say \"{{refusal}}\"

CONTEXT:
{{context}}

USER QUESTION:
{{question}}

STRICT REQUIREMENT:
- Use only information from CONTEXT.
- Do not hallucinate.
";

/// A fully rendered prompt, kept together with the inputs that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct GroundedPrompt {
    /// The rendered prompt text
    pub text: String,

    /// The context string embedded in the prompt
    pub context: String,

    /// The question embedded in the prompt
    pub question: String,
}

/// Build the grounded prompt for a question and its retrieved context.
///
/// An empty context is allowed: the prompt stays well-formed and the
/// refusal instruction carries the expected behavior.
///
/// # Arguments
/// * `question` - User query, embedded verbatim
/// * `context` - Concatenated retrieved chunk texts, embedded verbatim
/// * `template` - Optional template override (see [`crate::load_template`])
pub fn build_grounded_prompt(
    question: &str,
    context: &str,
    template: Option<&str>,
) -> AppResult<GroundedPrompt> {
    let template = template.unwrap_or(DEFAULT_TEMPLATE);

    let mut variables = HashMap::new();
    variables.insert("context".to_string(), context.to_string());
    variables.insert("question".to_string(), question.to_string());
    variables.insert("refusal".to_string(), REFUSAL_SENTENCE.to_string());

    let text = render_template(template, &variables)?;

    tracing::debug!(
        "Built grounded prompt ({} chars, context {} chars)",
        text.len(),
        context.len()
    );

    Ok(GroundedPrompt {
        text,
        context: context.to_string(),
        question: question.to_string(),
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output; HTML escaping would corrupt the context
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("grounded", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("grounded", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
