//! Response synthesis
//!
//! Merges the team's reasoning, evidence and predictions into one payload.
//! Every operation here is deterministic for a given input order.

use crate::consensus::ConsensusParticipant;
use crate::consensus::position::{modal, tally};
use crate::message::{Evidence, LogicalStructure, Prediction, ReasoningChain, ReasoningStep};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The merged content of all participants' messages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedResponse {
    pub reasoning: ReasoningChain,
    pub evidence: Vec<Evidence>,
    pub predictions: Vec<Prediction>,
}

/// Stateless merger for team output
#[derive(Debug, Clone, Copy)]
pub struct ResponseSynthesizer {
    max_predictions: usize,
}

impl Default for ResponseSynthesizer {
    fn default() -> Self {
        Self { max_predictions: 5 }
    }
}

impl ResponseSynthesizer {
    pub fn new(max_predictions: usize) -> Self {
        Self { max_predictions }
    }

    pub fn synthesize(&self, participants: &[ConsensusParticipant]) -> SynthesizedResponse {
        let chains: Vec<&ReasoningChain> =
            participants.iter().map(|p| &p.message.reasoning).collect();
        let evidence: Vec<&Evidence> = participants
            .iter()
            .flat_map(|p| p.message.evidence.iter())
            .collect();
        let predictions: Vec<&Prediction> = participants
            .iter()
            .flat_map(|p| p.message.predictions.iter())
            .collect();

        let mut top = Self::best_per_type(predictions);
        top.truncate(self.max_predictions);

        SynthesizedResponse {
            reasoning: Self::merge_reasoning(&chains),
            evidence: Self::rank_evidence(evidence),
            predictions: top,
        }
    }

    /// Merge chains: first occurrence of each (type, concept) survives,
    /// ordered by descending confidence mean.
    pub fn merge_reasoning(chains: &[&ReasoningChain]) -> ReasoningChain {
        let mut steps: Vec<ReasoningStep> = Vec::new();
        for step in chains.iter().flat_map(|c| c.steps.iter()) {
            if !steps
                .iter()
                .any(|s| s.step_type == step.step_type && s.concept == step.concept)
            {
                steps.push(step.clone());
            }
        }
        // stable: equal confidences keep first-seen order
        steps.sort_by(|a, b| b.confidence.mean.total_cmp(&a.confidence.mean));

        let mut structure = LogicalStructure::default();
        for chain in chains {
            structure.merge(&chain.structure);
        }

        let patterns = tally(
            chains
                .iter()
                .filter_map(|c| c.temporal_pattern.as_deref()),
        );
        let temporal_pattern = modal(&patterns).map(|(p, _)| p.to_string());

        ReasoningChain {
            steps,
            structure,
            temporal_pattern,
        }
    }

    /// Drop evidence with duplicate content, then rank by
    /// `confidence × reliability × relevance` descending.
    pub fn rank_evidence<'a, I>(evidence: I) -> Vec<Evidence>
    where
        I: IntoIterator<Item = &'a Evidence>,
    {
        let mut unique: Vec<Evidence> = Vec::new();
        for item in evidence {
            if !unique.iter().any(|e| e.content == item.content) {
                unique.push(item.clone());
            }
        }
        unique.sort_by(|a, b| {
            b.rank_score()
                .total_cmp(&a.rank_score())
                .then_with(|| a.content.cmp(&b.content))
        });
        unique
    }

    /// Keep only the highest-confidence prediction of each type,
    /// most confident first.
    pub fn best_per_type<'a, I>(predictions: I) -> Vec<Prediction>
    where
        I: IntoIterator<Item = &'a Prediction>,
    {
        let mut best: Vec<Prediction> = Vec::new();
        for prediction in predictions {
            match best
                .iter_mut()
                .find(|p| p.prediction_type == prediction.prediction_type)
            {
                Some(existing) => {
                    if prediction.confidence.mean > existing.confidence.mean {
                        *existing = prediction.clone();
                    }
                }
                None => best.push(prediction.clone()),
            }
        }
        best.sort_by(|a, b| {
            b.confidence
                .mean
                .partial_cmp(&a.confidence.mean)
                .unwrap_or(Ordering::Equal)
        });
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, StepType};

    fn step(id: &str, ty: StepType, concept: &str, confidence: f64) -> ReasoningStep {
        ReasoningStep::new(id, ty, concept, format!("{concept} via {id}")).with_confidence(confidence)
    }

    fn chain() -> ReasoningChain {
        let mut chain = ReasoningChain::new(vec![
            step("p1", StepType::Premise, "supply", 0.6),
            step("i1", StepType::Inference, "price", 0.8),
            step("c1", StepType::Conclusion, "buy", 0.7),
        ]);
        chain.structure = LogicalStructure {
            premises: vec!["p1".into()],
            inferences: vec!["i1".into()],
            conclusions: vec!["c1".into()],
            assumptions: vec![],
        };
        chain.temporal_pattern = Some("cyclical".into());
        chain
    }

    #[test]
    fn test_merge_is_idempotent_under_duplicates() {
        let c = chain();
        let once = ResponseSynthesizer::merge_reasoning(&[&c]);
        let twice = ResponseSynthesizer::merge_reasoning(&[&c, &c]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_keeps_first_and_sorts_by_confidence() {
        let a = ReasoningChain::new(vec![step("a1", StepType::Premise, "supply", 0.3)]);
        let b = ReasoningChain::new(vec![
            step("b1", StepType::Premise, "supply", 0.9),
            step("b2", StepType::Conclusion, "supply", 0.5),
        ]);
        let merged = ResponseSynthesizer::merge_reasoning(&[&a, &b]);
        let ids: Vec<_> = merged.steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b2", "a1"]);
    }

    #[test]
    fn test_temporal_pattern_is_mode() {
        let mut a = chain();
        a.temporal_pattern = Some("linear".into());
        let b = chain();
        let c = chain();
        let merged = ResponseSynthesizer::merge_reasoning(&[&a, &b, &c]);
        assert_eq!(merged.temporal_pattern.as_deref(), Some("cyclical"));
    }

    #[test]
    fn test_evidence_dedup_and_ranking() {
        let evidence = [
            Evidence::new("weak").with_scores(0.5, 0.5, 0.5),
            Evidence::new("strong").with_scores(0.9, 0.9, 0.9),
            Evidence::new("weak").with_scores(1.0, 1.0, 1.0),
            Evidence::new("middle").with_scores(0.8, 0.8, 0.8),
        ];
        let ranked = ResponseSynthesizer::rank_evidence(evidence.iter());
        let contents: Vec<_> = ranked.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["strong", "middle", "weak"]);
        // first occurrence kept
        assert_eq!(ranked[2].reliability, 0.5);

        // re-ranking the output changes nothing
        let again = ResponseSynthesizer::rank_evidence(ranked.iter());
        assert_eq!(again, ranked);
    }

    #[test]
    fn test_evidence_ties_are_ordered_by_content() {
        let evidence = [
            Evidence::new("b").with_scores(0.5, 0.5, 0.5),
            Evidence::new("a").with_scores(0.5, 0.5, 0.5),
        ];
        let forward = ResponseSynthesizer::rank_evidence(evidence.iter());
        let backward = ResponseSynthesizer::rank_evidence(evidence.iter().rev());
        assert_eq!(forward, backward);
        assert_eq!(forward[0].content, "a");
    }

    #[test]
    fn test_best_prediction_per_type() {
        let predictions = [
            Prediction::new("price", "up 5%", 0.6),
            Prediction::new("volume", "flat", 0.4),
            Prediction::new("price", "up 10%", 0.8),
        ];
        let best = ResponseSynthesizer::best_per_type(predictions.iter());
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].content, "up 10%");
        assert_eq!(best[1].prediction_type, "volume");
    }

    #[test]
    fn test_synthesize_truncates_predictions() {
        let mut message = Message::new("a");
        for i in 0..4 {
            message = message.with_prediction(Prediction::new(format!("t{i}"), "x", 0.5));
        }
        let participant = ConsensusParticipant::new("a", vec![], message, 0.5);
        let out = ResponseSynthesizer::new(2).synthesize(&[participant]);
        assert_eq!(out.predictions.len(), 2);
    }
}
