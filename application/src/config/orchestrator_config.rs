//! Orchestrator parameters.
//!
//! [`OrchestratorConfig`] holds the team-size bounds, quorum and quality
//! gates, and the pool and history sizes. `default_method` and `max_agents`
//! are also the values the adaptive controller mutates between calls.

use ensemble_domain::{ConfigIssue, ConfigIssueCode, ConsensusMethod};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Smallest team ever dispatched.
    pub min_agents: usize,
    /// Largest team ever dispatched (adapted at runtime).
    pub max_agents: usize,
    /// Surviving results required before consensus may run.
    pub min_participants: usize,
    /// Floor on consensus confidence, combined with the request's own minimum.
    pub quality_threshold: f64,
    /// Method used when the selection policy does not force one (adapted at runtime).
    pub default_method: ConsensusMethod,
    /// Fan-in deadline when a request declares no `max_time`.
    pub default_max_time: Duration,
    /// Idle agents kept for revival; oldest evicted first.
    pub idle_pool_capacity: usize,
    /// Assignments after which an active agent is no longer reused.
    pub workload_cap: usize,
    /// Past results kept for metrics and adaptation.
    pub history_capacity: usize,
    /// Most recent results the controller averages over.
    pub adaptation_window: usize,
    /// Predictions kept in the final result.
    pub max_predictions: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_agents: 3,
            max_agents: 7,
            min_participants: 2,
            quality_threshold: 0.6,
            default_method: ConsensusMethod::WeightedVoting,
            default_max_time: Duration::from_secs(120),
            idle_pool_capacity: 20,
            workload_cap: 3,
            history_capacity: 100,
            adaptation_window: 10,
            max_predictions: 5,
        }
    }
}

impl OrchestratorConfig {
    // ==================== Builder Methods ====================

    pub fn with_team_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_agents = min;
        self.max_agents = max;
        self
    }

    pub fn with_min_participants(mut self, n: usize) -> Self {
        self.min_participants = n;
        self
    }

    pub fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = threshold;
        self
    }

    pub fn with_default_method(mut self, method: ConsensusMethod) -> Self {
        self.default_method = method;
        self
    }

    pub fn with_default_max_time(mut self, max_time: Duration) -> Self {
        self.default_max_time = max_time;
        self
    }

    pub fn with_idle_pool_capacity(mut self, capacity: usize) -> Self {
        self.idle_pool_capacity = capacity;
        self
    }

    pub fn with_workload_cap(mut self, cap: usize) -> Self {
        self.workload_cap = cap;
        self
    }

    pub fn with_history(mut self, capacity: usize, window: usize) -> Self {
        self.history_capacity = capacity;
        self.adaptation_window = window;
        self
    }

    pub fn with_max_predictions(mut self, n: usize) -> Self {
        self.max_predictions = n;
        self
    }

    // ==================== Derived Values ====================

    /// The confidence a consensus must reach for a request.
    pub fn effective_threshold(&self, request_min_confidence: f64) -> f64 {
        request_min_confidence.max(self.quality_threshold)
    }

    /// The fan-in deadline for a request.
    pub fn effective_max_time(&self, request_max_time: Option<Duration>) -> Duration {
        request_max_time.unwrap_or(self.default_max_time)
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.min_agents > self.max_agents {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::TeamBoundsInverted,
                format!(
                    "min_agents ({}) is larger than max_agents ({})",
                    self.min_agents, self.max_agents
                ),
            ));
        }

        if self.min_participants == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoQuorum,
                "min_participants must be at least 1",
            ));
        } else if self.min_participants > self.max_agents {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::QuorumUnreachable,
                format!(
                    "min_participants ({}) exceeds max_agents ({}); every call will fail quorum",
                    self.min_participants, self.max_agents
                ),
            ));
        }

        if !(0.0..=1.0).contains(&self.quality_threshold) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ThresholdOutOfRange,
                format!(
                    "quality_threshold ({}) must be within [0, 1]",
                    self.quality_threshold
                ),
            ));
        }

        issues
    }
}
