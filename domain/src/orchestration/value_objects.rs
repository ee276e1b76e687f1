//! Orchestration value objects - immutable result types for one call.
//!
//! - [`OrchestrationResult`] - Final payload returned to the caller
//! - [`PerformanceReport`] - Timings and team composition of that call
//! - [`PerformanceMetrics`] - Rolling averages across calls

use crate::consensus::{ConsensusMethod, ConsensusResult};
use crate::message::{ConfidenceInterval, Evidence, Prediction, ReasoningChain};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call performance summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Wall-clock time of the whole call
    #[serde(with = "duration_ms")]
    pub total_time: Duration,
    /// Agents dispatched
    pub team_size: usize,
    /// Agents whose message reached consensus
    pub participants: usize,
    /// Agents that failed or missed the deadline
    pub failed_agents: usize,
    pub reused_agents: usize,
    pub spawned_agents: usize,
    pub method: ConsensusMethod,
    pub complexity: f64,
    /// Rough token cost, see `estimate_tokens`
    pub estimated_cost: f64,
    /// Estimate exceeded the request's `max_cost`
    pub over_budget: bool,
}

/// Complete result of one orchestration call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub response: String,
    pub confidence: ConfidenceInterval,
    pub reasoning: ReasoningChain,
    pub evidence: Vec<Evidence>,
    pub consensus: ConsensusResult,
    pub performance: PerformanceReport,
    pub predictions: Vec<Prediction>,
}

impl OrchestrationResult {
    pub fn confidence_mean(&self) -> f64 {
        self.confidence.mean
    }
}

/// Rolling averages over the orchestrator's history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(with = "duration_ms")]
    pub average_time: Duration,
    pub average_confidence: f64,
    pub average_team_size: f64,
    /// Successful calls over all calls, 0 before the first call
    pub success_rate: f64,
    pub total_calls: u64,
    /// Results currently held in history
    pub history_len: usize,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
