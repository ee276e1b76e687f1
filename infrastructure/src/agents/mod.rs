//! Reasoning agent adapters
//!
//! Implementations of the [`ReasoningAgent`](ensemble_application::ReasoningAgent)
//! and [`AgentFactory`](ensemble_application::AgentFactory) ports.

mod prompted;

pub use prompted::{PromptedAgent, PromptedAgentFactory};
