//! Domain layer for agent-ensemble
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Ensemble
//!
//! A team of specialized reasoning agents answers the same question
//! independently; their answers are reconciled into one consensus.
//!
//! - **Complexity**: how hard a request is decides team size and the
//!   capabilities the team must cover
//! - **Consensus**: one of four reconciliation methods picks the winning
//!   position, then a quality gate rejects low-confidence outcomes
//! - **Synthesis**: reasoning, evidence and predictions of all participants
//!   are merged into the final answer
//! - **Adaptation**: a controller tunes the default method and team size
//!   from recent outcomes

pub mod agent;
pub mod config;
pub mod consensus;
pub mod core;
pub mod llm;
pub mod message;
pub mod orchestration;
pub mod prompt;
pub mod synthesis;

// Re-export commonly used types
pub use agent::{AgentTemplate, Capability, CapabilityStrength, TemplateRegistry};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity, has_errors};
pub use consensus::{
    ConsensusEngine, ConsensusMethod, ConsensusParticipant, ConsensusResult, Dissent,
    ParticipantSummary, extract_position,
};
pub use core::{
    error::{ConsensusError, ConsensusQualityError, DomainError, QuorumError},
    request::{Constraints, Context, OrchestrationRequest, RequestMetadata},
};
pub use llm::{
    CompletionRequest, CompletionResponse, ModelSpec, RateLimit, TokenUsage, estimate_tokens,
};
pub use message::{
    BeliefSnapshot, ConfidenceInterval, Evidence, LogicalStructure, Message, Prediction,
    ReasoningChain, ReasoningStep, StepType, Uncertainty,
};
pub use orchestration::{
    adaptive::{AdaptiveController, Outcome, Policy, PolicyAdjustment},
    complexity::{ComplexityAnalyzer, ComplexityFactors, RequestComplexity},
    entities::Stage,
    value_objects::{OrchestrationResult, PerformanceMetrics, PerformanceReport},
};
pub use prompt::{ReasoningPromptTemplate, parse_reply};
pub use synthesis::{ResponseSynthesizer, SynthesizedResponse};
