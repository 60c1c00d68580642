//! Generation provider factory.
//!
//! Creates generation clients from the application configuration: resolves
//! the provider name, injects endpoint and timeout, and checks required
//! secrets.

use crate::client::Generator;
use crate::providers::OllamaGenerator;
use docqa_core::config::GenerationSettings;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a generation client from settings.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// API key is missing.
pub fn create_generator(
    settings: &GenerationSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn Generator>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = settings
                .endpoint
                .as_deref()
                .unwrap_or("http://localhost:11434");
            let client = OllamaGenerator::with_options(base_url, settings.timeout_secs)?;
            Ok(Arc::new(client))
        }
        "openai" => {
            if api_key.is_none() {
                return Err(AppError::Config(
                    "OpenAI provider requires an API key".to_string(),
                ));
            }
            Err(AppError::Config(
                "OpenAI provider not yet implemented".to_string(),
            ))
        }
        "claude" | "anthropic" => {
            if api_key.is_none() {
                return Err(AppError::Config(
                    "Claude provider requires an API key".to_string(),
                ));
            }
            Err(AppError::Config(
                "Claude provider not yet implemented".to_string(),
            ))
        }
        other => Err(AppError::Config(format!(
            "Unknown generation provider: {}",
            other
        ))),
    }
}
