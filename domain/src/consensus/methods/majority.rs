use super::{Reconciler, Reconciliation};
use crate::consensus::method::ConsensusMethod;
use crate::consensus::participant::ConsensusParticipant;
use crate::consensus::position::{modal, tally};
use crate::message::ConfidenceInterval;

/// One participant, one vote; the modal position wins.
///
/// Confidence is the winner's vote share; the bounds move the count by one
/// participant either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMajority;

impl Reconciler for SimpleMajority {
    fn method(&self) -> ConsensusMethod {
        ConsensusMethod::SimpleMajority
    }

    fn reconcile(&self, participants: &[ConsensusParticipant]) -> Reconciliation {
        let positions: Vec<String> = participants.iter().map(|p| p.position()).collect();
        let counts = tally(positions.iter().map(String::as_str));
        let (winner, votes) = modal(&counts).unwrap_or(("", 0));

        let n = participants.len().max(1) as f64;
        let votes = votes as f64;
        Reconciliation::new(
            winner,
            ConfidenceInterval::new(
                votes / n,
                (votes - 1.0) / n,
                (votes + 1.0) / n,
                self.method().as_str(),
            ),
        )
    }
}
