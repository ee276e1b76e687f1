//! The four reconciliation algorithms
//!
//! Each method turns the team's participants into a winning position and a
//! confidence interval. Participant summaries, dissent and the quality gate
//! are handled once by the engine, not per method.

mod bayesian;
mod game_theoretic;
mod majority;
mod weighted;

pub use bayesian::BayesianAggregation;
pub use game_theoretic::GameTheoretic;
pub use majority::SimpleMajority;
pub use weighted::WeightedVoting;

use super::method::ConsensusMethod;
use super::participant::ConsensusParticipant;
use crate::message::ConfidenceInterval;
use std::collections::BTreeMap;

/// What a reconciliation method decided
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub position: String,
    pub confidence: ConfidenceInterval,
    pub aggregate_beliefs: BTreeMap<String, f64>,
}

impl Reconciliation {
    pub fn new(position: impl Into<String>, confidence: ConfidenceInterval) -> Self {
        Self {
            position: position.into(),
            confidence,
            aggregate_beliefs: BTreeMap::new(),
        }
    }
}

/// A pluggable reconciliation algorithm
///
/// Callers guarantee `participants` is non-empty.
pub trait Reconciler: Send + Sync {
    fn method(&self) -> ConsensusMethod;

    fn reconcile(&self, participants: &[ConsensusParticipant]) -> Reconciliation;
}

/// The reconciler implementing `method`.
pub fn reconciler_for(method: ConsensusMethod) -> &'static dyn Reconciler {
    match method {
        ConsensusMethod::SimpleMajority => &SimpleMajority,
        ConsensusMethod::WeightedVoting => &WeightedVoting,
        ConsensusMethod::BayesianAggregation => &BayesianAggregation,
        ConsensusMethod::GameTheoretic => &GameTheoretic,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::super::participant::ConsensusParticipant;
    use crate::message::{Message, ReasoningStep, StepType};

    /// A participant concluding `position` with the given confidence.
    pub fn voter(id: &str, position: &str, confidence: f64, contribution: f64) -> ConsensusParticipant {
        let message = Message::new(id).with_step(
            ReasoningStep::new(format!("{id}-c"), StepType::Conclusion, "answer", position)
                .with_confidence(confidence),
        );
        ConsensusParticipant::new(id, vec![], message, contribution)
    }
}
