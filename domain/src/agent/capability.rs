//! Capability tags used to match agents to requests

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A reasoning capability an agent can specialize in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Reasoning,
    Integration,
    LogicalAnalysis,
    CriticalEvaluation,
    CreativeSynthesis,
    TemporalAnalysis,
}

impl Capability {
    /// Every capability, in the order used to pad small requirement sets.
    pub const ALL: [Capability; 6] = [
        Capability::Reasoning,
        Capability::Integration,
        Capability::LogicalAnalysis,
        Capability::CriticalEvaluation,
        Capability::CreativeSynthesis,
        Capability::TemporalAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Reasoning => "reasoning",
            Capability::Integration => "integration",
            Capability::LogicalAnalysis => "logical_analysis",
            Capability::CriticalEvaluation => "critical_evaluation",
            Capability::CreativeSynthesis => "creative_synthesis",
            Capability::TemporalAnalysis => "temporal_analysis",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| DomainError::UnknownCapability(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capability() {
        assert_eq!(
            "temporal_analysis".parse::<Capability>().unwrap(),
            Capability::TemporalAnalysis
        );
        assert!("telepathy".parse::<Capability>().is_err());
    }

    #[test]
    fn test_serialize_snake_case() {
        let json = serde_json::to_string(&Capability::CriticalEvaluation).unwrap();
        assert_eq!(json, "\"critical_evaluation\"");
    }
}
