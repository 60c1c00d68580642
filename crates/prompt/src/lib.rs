//! Grounded prompt construction for docqa.
//!
//! Owns the prompt template that constrains the generation service to the
//! retrieved context: the context and question are embedded verbatim, the
//! service is instructed to answer only from the context, and a fixed
//! refusal sentence is mandated when the context is insufficient.
//!
//! The grounding contract is advisory — it relies on the generation
//! service honoring instructions and is not mechanically enforced here.

pub mod grounded;
pub mod loader;

pub use grounded::{build_grounded_prompt, GroundedPrompt, REFUSAL_SENTENCE};
pub use loader::load_template;
