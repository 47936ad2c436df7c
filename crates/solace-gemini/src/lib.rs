// Gemini Driver Implementation
//
// This crate provides the production LanguageModel implementation for
// Solace, talking to the Gemini generateContent REST API. The pipeline
// only depends on the trait from solace-core, so a different backend can
// be swapped in by configuration without touching the orchestrator.

mod driver;
mod types;


pub use driver::{GeminiClient, DEFAULT_MODEL};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};

// Re-export the core trait for convenience
pub use solace_core::LanguageModel;
