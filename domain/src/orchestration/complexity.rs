//! Request complexity analysis
//!
//! Scores how hard a request is and derives which capabilities the team
//! needs and how large it should be. Pure function of the request.

use crate::agent::Capability;
use crate::core::request::OrchestrationRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

mod weights {
    /// Query length (chars) at which the length factor saturates
    pub const QUERY_LENGTH_CAP: f64 = 500.0;
    pub const QUERY_LENGTH: f64 = 0.2;
    /// Serialized context size (bytes) at which the context factor saturates
    pub const CONTEXT_SIZE_CAP: f64 = 1000.0;
    pub const CONTEXT_SIZE: f64 = 0.15;
    pub const PER_CONSTRAINT: f64 = 0.05;
    pub const PER_EVIDENCE: f64 = 0.05;
    pub const EVIDENCE_CAP: f64 = 0.15;
    pub const DETECTOR: f64 = 0.1;
}

const TEMPORAL_KEYWORDS: &[&str] = &[
    "when", "before", "after", "future", "past", "trend", "timeline", "history", "historical",
    "forecast", "predict", "over time", "evolve", "decade", "year",
];
const CREATIVE_KEYWORDS: &[&str] = &[
    "create", "design", "imagine", "invent", "novel", "brainstorm", "idea", "innovative",
    "creative", "alternative",
];
const ANALYTICAL_KEYWORDS: &[&str] = &[
    "analyze", "analyse", "compare", "calculate", "measure", "why", "cause", "relationship",
    "data", "logic", "prove", "derive",
];
const CRITIQUE_KEYWORDS: &[&str] = &[
    "critique", "criticize", "weakness", "flaw", "risk", "assess", "evaluate", "review",
    "pros and cons", "limitation", "judge",
];

/// Contribution of each scoring factor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexityFactors {
    pub query_length: f64,
    pub context_size: f64,
    pub constraints: f64,
    pub required_evidence: f64,
    pub temporal: bool,
    pub creative: bool,
    pub analytical: bool,
    pub critique: bool,
}

/// Derived difficulty of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestComplexity {
    /// Overall score in [0, 1]
    pub score: f64,
    pub factors: ComplexityFactors,
    /// Ordered, de-duplicated capability requirements
    pub required_capabilities: Vec<Capability>,
    pub recommended_team_size: usize,
}

impl RequestComplexity {
    pub fn capability_set(&self) -> BTreeSet<Capability> {
        self.required_capabilities.iter().copied().collect()
    }
}

/// Scores requests against fixed weights and keyword detectors
#[derive(Debug, Clone, Copy)]
pub struct ComplexityAnalyzer {
    min_agents: usize,
    max_agents: usize,
}

impl ComplexityAnalyzer {
    /// Minimum number of distinct capabilities every team must cover.
    pub const MIN_CAPABILITIES: usize = 3;

    pub fn new(min_agents: usize, max_agents: usize) -> Self {
        Self {
            min_agents,
            max_agents: max_agents.max(min_agents),
        }
    }

    pub fn analyze(&self, request: &OrchestrationRequest) -> RequestComplexity {
        let query = request.query.to_lowercase();

        let factors = ComplexityFactors {
            query_length: (request.query.chars().count() as f64 / weights::QUERY_LENGTH_CAP)
                .min(1.0)
                * weights::QUERY_LENGTH,
            context_size: (request.context_size() as f64 / weights::CONTEXT_SIZE_CAP).min(1.0)
                * weights::CONTEXT_SIZE,
            constraints: request.constraints.declared_count() as f64 * weights::PER_CONSTRAINT,
            required_evidence: (request.constraints.required_evidence.len() as f64
                * weights::PER_EVIDENCE)
                .min(weights::EVIDENCE_CAP),
            temporal: detect(&query, TEMPORAL_KEYWORDS),
            creative: detect(&query, CREATIVE_KEYWORDS),
            analytical: detect(&query, ANALYTICAL_KEYWORDS),
            critique: detect(&query, CRITIQUE_KEYWORDS),
        };

        let detectors = [
            factors.temporal,
            factors.creative,
            factors.analytical,
            factors.critique,
        ]
        .into_iter()
        .filter(|hit| *hit)
        .count() as f64;

        let score = (factors.query_length
            + factors.context_size
            + factors.constraints
            + factors.required_evidence
            + detectors * weights::DETECTOR)
            .clamp(0.0, 1.0);

        let mut required = vec![Capability::Reasoning, Capability::Integration];
        for (hit, capability) in [
            (factors.temporal, Capability::TemporalAnalysis),
            (factors.creative, Capability::CreativeSynthesis),
            (factors.analytical, Capability::LogicalAnalysis),
            (factors.critique, Capability::CriticalEvaluation),
        ] {
            if hit {
                required.push(capability);
            }
        }
        // Perspective floor: even trivial queries get three viewpoints
        for capability in Capability::ALL {
            if required.len() >= Self::MIN_CAPABILITIES {
                break;
            }
            if !required.contains(&capability) {
                required.push(capability);
            }
        }

        let recommended_team_size =
            ((score * 10.0).ceil() as usize).clamp(self.min_agents, self.max_agents);

        RequestComplexity {
            score,
            factors,
            required_capabilities: required,
            recommended_team_size,
        }
    }
}

/// Word-boundary keyword match; multi-word keywords match as phrases.
fn detect(query: &str, keywords: &[&str]) -> bool {
    let words: Vec<&str> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    keywords.iter().any(|keyword| {
        if keyword.contains(' ') {
            query.contains(keyword)
        } else {
            words.iter().any(|w| w == keyword || w.strip_suffix('s') == Some(keyword))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn analyzer() -> ComplexityAnalyzer {
        ComplexityAnalyzer::new(3, 7)
    }

    #[test]
    fn test_simple_query_is_padded_to_three_capabilities() {
        let c = analyzer().analyze(&OrchestrationRequest::new("Hello there"));
        assert_eq!(
            c.required_capabilities,
            vec![
                Capability::Reasoning,
                Capability::Integration,
                Capability::LogicalAnalysis
            ]
        );
        assert_eq!(c.recommended_team_size, 3);
    }

    #[test]
    fn test_detectors_add_capabilities() {
        let c = analyzer().analyze(&OrchestrationRequest::new(
            "Forecast the trend and critique the weaknesses of this novel design",
        ));
        assert!(c.factors.temporal);
        assert!(c.factors.creative);
        assert!(c.factors.critique);
        assert!(!c.factors.analytical);
        let caps = c.capability_set();
        assert!(caps.contains(&Capability::TemporalAnalysis));
        assert!(caps.contains(&Capability::CreativeSynthesis));
        assert!(caps.contains(&Capability::CriticalEvaluation));
        assert_eq!(c.required_capabilities.len(), 5);
    }

    #[test]
    fn test_detector_requires_word_boundary() {
        // "swhen" must not trigger the temporal detector
        assert!(!detect("swhen", TEMPORAL_KEYWORDS));
        assert!(detect("pros and cons of rust", CRITIQUE_KEYWORDS));
        assert!(detect("long-term trends", TEMPORAL_KEYWORDS));
    }

    #[test]
    fn test_score_is_clamped_and_team_size_bounded() {
        let long_query = format!(
            "Analyze, forecast, critique and design: {}",
            "x ".repeat(600)
        );
        let mut request = OrchestrationRequest::new(long_query)
            .with_max_time(Duration::from_secs(30))
            .with_max_cost(1.0)
            .with_min_confidence(0.8)
            .with_required_evidence("a")
            .with_required_evidence("b")
            .with_required_evidence("c")
            .with_required_evidence("d");
        request
            .context
            .insert("blob".into(), serde_json::Value::String("y".repeat(2000)));

        let c = analyzer().analyze(&request);
        assert_eq!(c.score, 1.0);
        assert_eq!(c.recommended_team_size, 7);
    }

    #[test]
    fn test_team_size_follows_score() {
        // two detectors => 0.2 plus a little length
        let c = analyzer().analyze(&OrchestrationRequest::new(
            "Why did the trend reverse?",
        ));
        assert!(c.score > 0.2 && c.score < 0.3);
        assert_eq!(c.recommended_team_size, 3);

        let wide = ComplexityAnalyzer::new(1, 10)
            .analyze(&OrchestrationRequest::new("Why did the trend reverse?"));
        assert_eq!(wide.recommended_team_size, 3);
    }
}
