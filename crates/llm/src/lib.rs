//! Generation service integration for docqa.
//!
//! This crate provides a provider-agnostic abstraction for the text
//! generation boundary of the pipeline. Providers are hidden behind the
//! [`Generator`] trait so the answering logic (and its tests) never depend
//! on a specific external service.
//!
//! # Providers
//! - **Ollama**: local LLM runtime (default)
//! - Hosted providers (OpenAI, Anthropic) are reserved names in the factory
//!
//! # Example
//! ```no_run
//! use docqa_llm::{Generator, GenerationRequest, providers::OllamaGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaGenerator::new();
//! let request = GenerationRequest::new("Hello, world!", "llama3.2");
//! let response = client.generate(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{GenerationRequest, GenerationResponse, GenerationUsage, Generator};
pub use factory::create_generator;
pub use providers::OllamaGenerator;
