//! Orchestration domain entities

use serde::{Deserialize, Serialize};

/// Stage of one orchestration call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Request validation and complexity scoring
    Analysis,
    /// Team assembly: reuse, revival and spawning
    Assembly,
    /// Parallel dispatch and fan-in
    Dispatch,
    /// Method selection, reconciliation and quality gate
    Consensus,
    /// Merging reasoning, evidence and predictions
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Analysis => "analysis",
            Stage::Assembly => "assembly",
            Stage::Dispatch => "dispatch",
            Stage::Consensus => "consensus",
            Stage::Synthesis => "synthesis",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Stage::Analysis => "Complexity Analysis",
            Stage::Assembly => "Team Assembly",
            Stage::Dispatch => "Agent Dispatch",
            Stage::Consensus => "Consensus",
            Stage::Synthesis => "Synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
