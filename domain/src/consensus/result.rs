//! Consensus result value objects

use super::method::ConsensusMethod;
use crate::agent::Capability;
use crate::message::ConfidenceInterval;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How one participant voted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub agent_id: String,
    pub capabilities: Vec<Capability>,
    pub contribution: f64,
    pub position: String,
    pub confidence: f64,
}

/// A participant that disagreed with the final consensus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dissent {
    pub agent_id: String,
    pub position: String,
    /// Short excerpt of the dissenting reasoning
    pub reasoning: String,
}

/// The reconciled answer of one orchestration call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub id: String,
    pub consensus: String,
    pub confidence: ConfidenceInterval,
    pub participants: Vec<ParticipantSummary>,
    pub dissent: Vec<Dissent>,
    pub method: ConsensusMethod,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Per-variable aggregate belief (Bayesian aggregation only)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggregate_beliefs: BTreeMap<String, f64>,
}

impl ConsensusResult {
    /// Whether every participant agreed with the consensus.
    pub fn is_unanimous(&self) -> bool {
        self.dissent.is_empty()
    }

    /// Fraction of participants that agreed with the consensus.
    pub fn agreement_ratio(&self) -> f64 {
        if self.participants.is_empty() {
            0.0
        } else {
            1.0 - self.dissent.len() as f64 / self.participants.len() as f64
        }
    }
}
