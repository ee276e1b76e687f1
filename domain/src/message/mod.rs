//! Agent message types
//!
//! A [`Message`] is what a reasoning agent hands back for one query. The
//! orchestrator never mutates a message; it only reads and aggregates the
//! fields defined here.

mod confidence;
mod reasoning;

pub use confidence::ConfidenceInterval;
pub use reasoning::{LogicalStructure, ReasoningChain, ReasoningStep, StepType};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-variable probability that a proposition is true.
pub type BeliefSnapshot = BTreeMap<String, f64>;

/// A piece of evidence cited by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub confidence: ConfidenceInterval,
    /// How trustworthy the source is (0.0 to 1.0)
    #[serde(default = "half")]
    pub reliability: f64,
    /// How closely it bears on the query (0.0 to 1.0)
    #[serde(default = "half")]
    pub relevance: f64,
}

fn half() -> f64 {
    0.5
}

impl Evidence {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: None,
            confidence: ConfidenceInterval::default(),
            reliability: 0.5,
            relevance: 0.5,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_scores(mut self, confidence: f64, reliability: f64, relevance: f64) -> Self {
        self.confidence = ConfidenceInterval::point(confidence);
        self.reliability = reliability.clamp(0.0, 1.0);
        self.relevance = relevance.clamp(0.0, 1.0);
        self
    }

    /// Ranking score: confidence × reliability × relevance.
    pub fn rank_score(&self) -> f64 {
        self.confidence.mean * self.reliability * self.relevance
    }
}

/// A forward-looking claim made by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "type")]
    pub prediction_type: String,
    pub content: String,
    #[serde(default)]
    pub confidence: ConfidenceInterval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<String>,
}

impl Prediction {
    pub fn new(prediction_type: impl Into<String>, content: impl Into<String>, confidence: f64) -> Self {
        Self {
            prediction_type: prediction_type.into(),
            content: content.into(),
            confidence: ConfidenceInterval::point(confidence),
            horizon: None,
        }
    }
}

/// Uncertainty estimate attached to a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uncertainty {
    pub total: f64,
    #[serde(default)]
    pub epistemic: f64,
    #[serde(default)]
    pub aleatoric: f64,
}

impl Uncertainty {
    pub fn new(total: f64) -> Self {
        Self {
            total: total.clamp(0.0, 1.0),
            epistemic: 0.0,
            aleatoric: 0.0,
        }
    }
}

impl Default for Uncertainty {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// One agent's complete answer to a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub reasoning: ReasoningChain,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    #[serde(default)]
    pub uncertainty: Uncertainty,
    #[serde(default)]
    pub beliefs: BeliefSnapshot,
}

impl Message {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            ..Default::default()
        }
    }

    pub fn with_step(mut self, step: ReasoningStep) -> Self {
        self.reasoning.steps.push(step);
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    pub fn with_prediction(mut self, prediction: Prediction) -> Self {
        self.predictions.push(prediction);
        self
    }

    pub fn with_uncertainty(mut self, total: f64) -> Self {
        self.uncertainty = Uncertainty::new(total);
        self
    }

    pub fn with_belief(mut self, variable: impl Into<String>, probability: f64) -> Self {
        self.beliefs.insert(variable.into(), probability.clamp(0.0, 1.0));
        self
    }

    pub fn with_temporal_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.reasoning.temporal_pattern = Some(pattern.into());
        self
    }

    /// All free text in the message: step contents, then evidence.
    pub fn text(&self) -> String {
        self.reasoning
            .steps
            .iter()
            .map(|s| s.content.as_str())
            .chain(self.evidence.iter().map(|e| e.content.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
