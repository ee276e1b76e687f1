//! Domain error types

use thiserror::Error;

use crate::consensus::ConsensusMethod;

/// Domain-level errors for invalid input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid constraint {name}: {reason}")]
    InvalidConstraint { name: &'static str, reason: String },

    #[error("Unknown consensus method: {0}")]
    UnknownConsensusMethod(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),
}

/// Fewer agents survived dispatch than the configured quorum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Quorum not reached: {received} of {required} required participants responded")]
pub struct QuorumError {
    pub required: usize,
    pub received: usize,
}

/// The consensus confidence fell below the effective threshold.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Consensus confidence {confidence:.3} below threshold {threshold:.3} ({method})")]
pub struct ConsensusQualityError {
    pub method: ConsensusMethod,
    pub confidence: f64,
    pub threshold: f64,
}

/// Errors raised by the consensus engine itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    #[error("No participants to reconcile")]
    NoParticipants,

    #[error(transparent)]
    Quality(#[from] ConsensusQualityError),
}
