//! Application layer for agent-ensemble
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::OrchestratorConfig;
pub use ports::{
    event_logger::{EventLogger, NoEventLogger, OrchestrationEvent},
    llm_provider::{LlmProvider, ModelInterface, ProviderError, ProviderHandle},
    progress::{NoProgress, ProgressNotifier},
    reasoning_agent::{AgentError, AgentFactory, ReasoningAgent},
};
pub use use_cases::distribute::{AgentFailure, Assignment, Cancelled, Gathered, WorkDistributor};
pub use use_cases::orchestrate::{
    OrchestrateError, OrchestrationError, Orchestrator, SharedOrchestrator, StageFailure,
};
pub use use_cases::pool::{ActiveAgent, AgentPoolManager, Assembly};
