//! Reasoning agent port
//!
//! Agents are opaque to the orchestrator: it only calls the methods below
//! and reads the [`Message`] fields they return.

use super::llm_provider::{ModelInterface, ProviderError};
use async_trait::async_trait;
use ensemble_domain::{AgentTemplate, Capability, Context, Message};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by agents and agent factories
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Model call failed: {0}")]
    Model(#[from] ProviderError),

    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Agent construction failed: {0}")]
    Creation(String),
}

/// A specialized reasoning agent
#[async_trait]
pub trait ReasoningAgent: Send + Sync {
    fn id(&self) -> &str;

    fn capabilities(&self) -> &[Capability];

    /// Answer `query` from this agent's perspective using `model`.
    async fn process_query(
        &self,
        query: &str,
        context: &Context,
        model: &ModelInterface,
    ) -> Result<Message, AgentError>;

    /// Drop any per-query state so the agent can be reused from the idle pool.
    fn reset(&self);
}

/// Builds agents from templates
///
/// Construction is assumed expensive, which is why the pool keeps idle
/// agents around for revival.
#[async_trait]
pub trait AgentFactory: Send + Sync {
    async fn create(
        &self,
        id: &str,
        template: &AgentTemplate,
    ) -> Result<Arc<dyn ReasoningAgent>, AgentError>;
}
