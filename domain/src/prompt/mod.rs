//! Prompt domain
//!
//! Prompts sent to reasoning agents' models and parsing of their replies.

pub mod reply;
mod template;

pub use reply::parse_reply;
pub use template::ReasoningPromptTemplate;
