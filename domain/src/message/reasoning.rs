//! Reasoning chain types produced by agents

use super::confidence::ConfidenceInterval;
use serde::{Deserialize, Serialize};

/// Kind of a reasoning step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Observation,
    Premise,
    Assumption,
    Inference,
    Hypothesis,
    Analysis,
    Critique,
    Synthesis,
    Conclusion,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Observation => "observation",
            StepType::Premise => "premise",
            StepType::Assumption => "assumption",
            StepType::Inference => "inference",
            StepType::Hypothesis => "hypothesis",
            StepType::Analysis => "analysis",
            StepType::Critique => "critique",
            StepType::Synthesis => "synthesis",
            StepType::Conclusion => "conclusion",
        }
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single step in an agent's reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub concept: String,
    pub content: String,
    #[serde(default)]
    pub confidence: ConfidenceInterval,
    /// Ids of steps this one supports
    #[serde(default)]
    pub supports: Vec<String>,
    /// Ids of steps this one refutes
    #[serde(default)]
    pub refutes: Vec<String>,
}

impl ReasoningStep {
    pub fn new(
        id: impl Into<String>,
        step_type: StepType,
        concept: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            step_type,
            concept: concept.into(),
            content: content.into(),
            confidence: ConfidenceInterval::default(),
            supports: Vec::new(),
            refutes: Vec::new(),
        }
    }

    pub fn with_confidence(mut self, mean: f64) -> Self {
        self.confidence = ConfidenceInterval::point(mean);
        self
    }

    pub fn with_interval(mut self, confidence: ConfidenceInterval) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn supporting(mut self, step_id: impl Into<String>) -> Self {
        self.supports.push(step_id.into());
        self
    }

    pub fn refuting(mut self, step_id: impl Into<String>) -> Self {
        self.refutes.push(step_id.into());
        self
    }
}

/// Step ids grouped by logical role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalStructure {
    #[serde(default)]
    pub premises: Vec<String>,
    #[serde(default)]
    pub inferences: Vec<String>,
    #[serde(default)]
    pub conclusions: Vec<String>,
    #[serde(default)]
    pub assumptions: Vec<String>,
}

impl LogicalStructure {
    /// Union with `other`, keeping first-seen order and dropping duplicates.
    pub fn merge(&mut self, other: &LogicalStructure) {
        fn union(into: &mut Vec<String>, from: &[String]) {
            for id in from {
                if !into.contains(id) {
                    into.push(id.clone());
                }
            }
        }
        union(&mut self.premises, &other.premises);
        union(&mut self.inferences, &other.inferences);
        union(&mut self.conclusions, &other.conclusions);
        union(&mut self.assumptions, &other.assumptions);
    }
}

/// Ordered reasoning produced by one agent (or merged across a team)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningChain {
    #[serde(default)]
    pub steps: Vec<ReasoningStep>,
    #[serde(default)]
    pub structure: LogicalStructure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_pattern: Option<String>,
}

impl ReasoningChain {
    pub fn new(steps: Vec<ReasoningStep>) -> Self {
        Self {
            steps,
            ..Default::default()
        }
    }

    /// The last step explicitly marked as a conclusion.
    pub fn final_conclusion(&self) -> Option<&ReasoningStep> {
        self.steps
            .iter()
            .rev()
            .find(|s| s.step_type == StepType::Conclusion)
    }

    /// Mean of the per-step confidence means, `None` for an empty chain.
    pub fn mean_confidence(&self) -> Option<f64> {
        if self.steps.is_empty() {
            return None;
        }
        let sum: f64 = self.steps.iter().map(|s| s.confidence.mean).sum();
        Some(sum / self.steps.len() as f64)
    }
}
