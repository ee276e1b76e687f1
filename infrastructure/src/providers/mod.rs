//! Model provider adapters
//!
//! Implementations of the [`LlmProvider`](ensemble_application::LlmProvider)
//! port. Each adapter owns its wire format and retry policy.

mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleProvider;
