use super::{Reconciler, Reconciliation};
use crate::consensus::method::ConsensusMethod;
use crate::consensus::participant::ConsensusParticipant;
use crate::consensus::position::{modal, tally};
use crate::message::ConfidenceInterval;
use std::collections::BTreeMap;

/// Aggregates belief snapshots and uncertainty across the team.
///
/// The per-variable aggregate beliefs are computed and reported, but the
/// consensus text is still the most frequent conclusion. The aggregates
/// only inform confidence: mean is `1 - average(uncertainty.total)`, with
/// bounds from the most and least uncertain participants.
#[derive(Debug, Clone, Copy, Default)]
pub struct BayesianAggregation;

impl BayesianAggregation {
    /// Average reported probability per variable, over the participants that report it.
    pub fn aggregate_beliefs(participants: &[ConsensusParticipant]) -> BTreeMap<String, f64> {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for participant in participants {
            for (variable, probability) in &participant.message.beliefs {
                let entry = sums.entry(variable.clone()).or_insert((0.0, 0));
                entry.0 += probability;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(variable, (sum, n))| (variable, sum / n as f64))
            .collect()
    }
}

impl Reconciler for BayesianAggregation {
    fn method(&self) -> ConsensusMethod {
        ConsensusMethod::BayesianAggregation
    }

    fn reconcile(&self, participants: &[ConsensusParticipant]) -> Reconciliation {
        let aggregate_beliefs = Self::aggregate_beliefs(participants);

        let positions: Vec<String> = participants.iter().map(|p| p.position()).collect();
        let counts = tally(positions.iter().map(String::as_str));
        let winner = modal(&counts).map(|(p, _)| p).unwrap_or_default();

        let uncertainties: Vec<f64> = participants
            .iter()
            .map(|p| p.message.uncertainty.total.clamp(0.0, 1.0))
            .collect();
        let n = uncertainties.len().max(1) as f64;
        let average = uncertainties.iter().sum::<f64>() / n;
        let most = uncertainties.iter().copied().fold(0.0, f64::max);
        let least = uncertainties.iter().copied().fold(1.0, f64::min);

        let mut reconciliation = Reconciliation::new(
            winner,
            ConfidenceInterval::new(1.0 - average, 1.0 - most, 1.0 - least, self.method().as_str()),
        );
        reconciliation.aggregate_beliefs = aggregate_beliefs;
        reconciliation
    }
}
