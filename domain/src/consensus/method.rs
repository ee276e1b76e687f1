//! Consensus method selection

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Participant count above which Bayesian aggregation is forced.
pub const LARGE_TEAM_THRESHOLD: usize = 10;

/// Requested confidence above which the game-theoretic method is forced.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.9;

/// How a team's positions are reconciled into one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusMethod {
    SimpleMajority,
    #[default]
    WeightedVoting,
    BayesianAggregation,
    GameTheoretic,
}

impl ConsensusMethod {
    pub const ALL: [ConsensusMethod; 4] = [
        ConsensusMethod::SimpleMajority,
        ConsensusMethod::WeightedVoting,
        ConsensusMethod::BayesianAggregation,
        ConsensusMethod::GameTheoretic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusMethod::SimpleMajority => "simple_majority",
            ConsensusMethod::WeightedVoting => "weighted_voting",
            ConsensusMethod::BayesianAggregation => "bayesian_aggregation",
            ConsensusMethod::GameTheoretic => "game_theoretic",
        }
    }

    /// Next method in the fixed adaptation cycle (wraps around).
    pub fn next(&self) -> Self {
        match self {
            ConsensusMethod::SimpleMajority => ConsensusMethod::WeightedVoting,
            ConsensusMethod::WeightedVoting => ConsensusMethod::BayesianAggregation,
            ConsensusMethod::BayesianAggregation => ConsensusMethod::GameTheoretic,
            ConsensusMethod::GameTheoretic => ConsensusMethod::SimpleMajority,
        }
    }

    /// Pick the method for one call.
    ///
    /// Large teams always aggregate; very demanding callers get the most
    /// conservative method; everyone else gets the current default.
    pub fn select(participant_count: usize, min_confidence: f64, default: Self) -> Self {
        if participant_count > LARGE_TEAM_THRESHOLD {
            ConsensusMethod::BayesianAggregation
        } else if min_confidence > HIGH_CONFIDENCE_THRESHOLD {
            ConsensusMethod::GameTheoretic
        } else {
            default
        }
    }
}

impl std::fmt::Display for ConsensusMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ConsensusMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "simple_majority" | "majority" => Ok(ConsensusMethod::SimpleMajority),
            "weighted_voting" | "weighted" => Ok(ConsensusMethod::WeightedVoting),
            "bayesian_aggregation" | "bayesian" => Ok(ConsensusMethod::BayesianAggregation),
            "game_theoretic" | "game" => Ok(ConsensusMethod::GameTheoretic),
            _ => Err(DomainError::UnknownConsensusMethod(s.to_string())),
        }
    }
}
