//! Agent reply parsing.
//!
//! Models are asked for a JSON message (see [`ReasoningPromptTemplate`]).
//! [`parse_reply`] accepts that JSON, optionally wrapped in prose or a code
//! fence, and falls back to a single conclusion step built from the raw text.
//!
//! [`ReasoningPromptTemplate`]: super::ReasoningPromptTemplate

use crate::message::{
    ConfidenceInterval, Evidence, LogicalStructure, Message, Prediction, ReasoningChain,
    ReasoningStep, StepType, Uncertainty,
};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Confidence given to a conclusion recovered from unstructured text
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    steps: Vec<StepReply>,
    #[serde(default)]
    evidence: Vec<EvidenceReply>,
    #[serde(default)]
    predictions: Vec<PredictionReply>,
    uncertainty: Option<f64>,
    #[serde(default)]
    beliefs: BTreeMap<String, f64>,
    temporal_pattern: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StepReply {
    id: Option<String>,
    #[serde(rename = "type")]
    step_type: StepType,
    #[serde(default)]
    concept: String,
    content: String,
    confidence: Option<f64>,
    #[serde(default)]
    supports: Vec<String>,
    #[serde(default)]
    refutes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EvidenceReply {
    content: String,
    source: Option<String>,
    confidence: Option<f64>,
    reliability: Option<f64>,
    relevance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PredictionReply {
    #[serde(rename = "type")]
    prediction_type: String,
    content: String,
    confidence: Option<f64>,
    horizon: Option<String>,
}

/// Parse a model reply into a [`Message`] for `agent_id`.
///
/// `concept` labels the fallback conclusion when the reply is not JSON.
pub fn parse_reply(agent_id: &str, raw: &str, concept: &str) -> Message {
    match extract_json(raw).and_then(|json| serde_json::from_str::<Reply>(json).ok()) {
        Some(reply) if !reply.steps.is_empty() => from_reply(agent_id, reply),
        _ => fallback(agent_id, raw, concept),
    }
}

fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn from_reply(agent_id: &str, reply: Reply) -> Message {
    let mut structure = LogicalStructure::default();
    let steps: Vec<ReasoningStep> = reply
        .steps
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let id = s.id.unwrap_or_else(|| format!("s{}", i + 1));
            let bucket = match s.step_type {
                StepType::Premise | StepType::Observation => Some(&mut structure.premises),
                StepType::Inference | StepType::Analysis => Some(&mut structure.inferences),
                StepType::Conclusion => Some(&mut structure.conclusions),
                StepType::Assumption | StepType::Hypothesis => Some(&mut structure.assumptions),
                StepType::Critique | StepType::Synthesis => None,
            };
            if let Some(bucket) = bucket {
                bucket.push(id.clone());
            }

            let mut step = ReasoningStep::new(id, s.step_type, s.concept, s.content.trim())
                .with_interval(interval(s.confidence));
            step.supports = s.supports;
            step.refutes = s.refutes;
            step
        })
        .collect();

    let evidence = reply
        .evidence
        .into_iter()
        .map(|e| {
            let mut item = Evidence::new(e.content).with_scores(
                e.confidence.unwrap_or(0.5),
                e.reliability.unwrap_or(0.5),
                e.relevance.unwrap_or(0.5),
            );
            item.source = e.source;
            item
        })
        .collect();

    let predictions = reply
        .predictions
        .into_iter()
        .map(|p| {
            let mut prediction =
                Prediction::new(p.prediction_type, p.content, p.confidence.unwrap_or(0.5));
            prediction.horizon = p.horizon;
            prediction
        })
        .collect();

    Message {
        agent_id: agent_id.to_string(),
        reasoning: ReasoningChain {
            steps,
            structure,
            temporal_pattern: reply.temporal_pattern.filter(|p| !p.trim().is_empty()),
        },
        evidence,
        predictions,
        uncertainty: reply.uncertainty.map(Uncertainty::new).unwrap_or_default(),
        beliefs: reply
            .beliefs
            .into_iter()
            .map(|(k, v)| (k, v.clamp(0.0, 1.0)))
            .collect(),
    }
}

fn interval(confidence: Option<f64>) -> ConfidenceInterval {
    ConfidenceInterval::point(confidence.unwrap_or(0.5))
}

fn fallback(agent_id: &str, raw: &str, concept: &str) -> Message {
    let step = ReasoningStep::new("s1", StepType::Conclusion, concept, raw.trim())
        .with_confidence(FALLBACK_CONFIDENCE);
    let mut message = Message::new(agent_id)
        .with_step(step)
        .with_uncertainty(1.0 - FALLBACK_CONFIDENCE);
    message.reasoning.structure.conclusions.push("s1".to_string());
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_reply() {
        let raw = r#"Here you go:
```json
{
  "steps": [
    {"id": "p1", "type": "premise", "concept": "rates", "content": "Inflation is cooling", "confidence": 0.8},
    {"type": "conclusion", "concept": "rates", "content": " Rates will fall ", "confidence": 0.7, "supports": ["p1"]}
  ],
  "evidence": [{"content": "CPI down 3 months", "source": "BLS", "confidence": 0.9, "reliability": 0.9}],
  "predictions": [{"type": "rates", "content": "cut in Q3", "confidence": 0.6}],
  "uncertainty": 0.3,
  "beliefs": {"cut_this_year": 1.4},
  "temporal_pattern": "cyclical"
}
```"#;
        let msg = parse_reply("a1", raw, "reasoning");
        assert_eq!(msg.agent_id, "a1");
        assert_eq!(msg.reasoning.steps.len(), 2);
        assert_eq!(msg.reasoning.steps[1].id, "s2");
        assert_eq!(msg.reasoning.steps[1].content, "Rates will fall");
        assert_eq!(msg.reasoning.steps[1].supports, vec!["p1"]);
        assert_eq!(msg.reasoning.structure.premises, vec!["p1"]);
        assert_eq!(msg.reasoning.structure.conclusions, vec!["s2"]);
        assert_eq!(msg.reasoning.temporal_pattern.as_deref(), Some("cyclical"));
        assert_eq!(msg.evidence[0].source.as_deref(), Some("BLS"));
        assert_eq!(msg.evidence[0].relevance, 0.5);
        assert_eq!(msg.predictions[0].prediction_type, "rates");
        assert_eq!(msg.uncertainty.total, 0.3);
        assert_eq!(msg.beliefs["cut_this_year"], 1.0);
    }

    #[test]
    fn test_plain_text_falls_back_to_conclusion() {
        let msg = parse_reply("a1", "  Rates will probably fall.  ", "logical_analysis");
        assert_eq!(msg.reasoning.steps.len(), 1);
        let step = &msg.reasoning.steps[0];
        assert_eq!(step.step_type, StepType::Conclusion);
        assert_eq!(step.concept, "logical_analysis");
        assert_eq!(step.content, "Rates will probably fall.");
        assert_eq!(msg.uncertainty.total, 0.5);
    }

    #[test]
    fn test_json_without_steps_falls_back() {
        let msg = parse_reply("a1", r#"{"uncertainty": 0.1}"#, "reasoning");
        assert_eq!(msg.reasoning.steps.len(), 1);
        assert_eq!(msg.reasoning.steps[0].content, r#"{"uncertainty": 0.1}"#);
    }

    #[test]
    fn test_unknown_step_type_falls_back() {
        let raw = r#"{"steps": [{"type": "guess", "content": "maybe"}]}"#;
        let msg = parse_reply("a1", raw, "reasoning");
        assert_eq!(msg.reasoning.steps[0].step_type, StepType::Conclusion);
    }
}
