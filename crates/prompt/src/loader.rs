//! Loading of custom prompt templates.

use docqa_core::{AppError, AppResult};
use std::path::Path;

/// Load a custom grounded-prompt template from a file.
///
/// The template must carry both the `{{context}}` and `{{question}}`
/// placeholders; a template that drops either cannot express the grounding
/// contract and is rejected.
pub fn load_template(path: &Path) -> AppResult<String> {
    let template = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read template {:?}: {}", path, e))
    })?;

    for placeholder in ["{{context}}", "{{question}}"] {
        if !template.contains(placeholder) {
            return Err(AppError::Prompt(format!(
                "Template {:?} is missing the {} placeholder",
                path, placeholder
            )));
        }
    }

    tracing::debug!("Loaded custom prompt template from {:?}", path);
    Ok(template)
}
