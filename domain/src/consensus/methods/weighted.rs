use super::{Reconciler, Reconciliation};
use crate::consensus::method::ConsensusMethod;
use crate::consensus::participant::ConsensusParticipant;
use crate::message::ConfidenceInterval;

/// Absolute half-width of the reported interval
const BAND: f64 = 0.1;

/// Votes weighted by `contribution × own confidence`.
///
/// Under uniform weights this picks the same position as
/// [`SimpleMajority`](super::SimpleMajority), including tie-breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedVoting;

impl Reconciler for WeightedVoting {
    fn method(&self) -> ConsensusMethod {
        ConsensusMethod::WeightedVoting
    }

    fn reconcile(&self, participants: &[ConsensusParticipant]) -> Reconciliation {
        let mut sums: Vec<(String, f64)> = Vec::new();
        for participant in participants {
            let position = participant.position();
            let weight = participant.weight();
            match sums.iter_mut().find(|(p, _)| *p == position) {
                Some((_, sum)) => *sum += weight,
                None => sums.push((position, weight)),
            }
        }

        let total: f64 = sums.iter().map(|(_, w)| w).sum();
        let (winner, weight) = sums
            .iter()
            .fold(None::<&(String, f64)>, |best, entry| match best {
                Some(b) if b.1 >= entry.1 => Some(b),
                _ => Some(entry),
            })
            .map(|(p, w)| (p.clone(), *w))
            .unwrap_or_default();

        let share = if total > 0.0 { weight / total } else { 0.0 };
        Reconciliation::new(
            winner,
            ConfidenceInterval::banded(share, BAND, self.method().as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::SimpleMajority;
    use super::super::fixtures::voter;
    use super::*;

    #[test]
    fn test_heavy_minority_wins() {
        let participants = vec![
            voter("a", "A", 0.2, 0.2),
            voter("b", "A", 0.2, 0.2),
            voter("c", "B", 0.9, 0.9),
        ];
        let r = WeightedVoting.reconcile(&participants);
        assert_eq!(r.position, "B");
        let expected = 0.81 / (0.81 + 0.08);
        assert!((r.confidence.mean - expected).abs() < 1e-9);
        assert!((r.confidence.lower - (expected - 0.1)).abs() < 1e-9);
        assert_eq!(r.confidence.upper, 1.0);
    }

    #[test]
    fn test_uniform_weights_agree_with_majority() {
        for positions in [
            vec!["A", "A", "B"],
            vec!["B", "A", "A"],
            vec!["X", "Y"],
            vec!["P", "Q", "Q", "P", "R"],
        ] {
            let participants: Vec<_> = positions
                .iter()
                .enumerate()
                .map(|(i, p)| voter(&format!("a{i}"), p, 0.8, 0.6))
                .collect();
            let weighted = WeightedVoting.reconcile(&participants);
            let majority = SimpleMajority.reconcile(&participants);
            assert_eq!(weighted.position, majority.position, "{positions:?}");
            assert!((weighted.confidence.mean - majority.confidence.mean).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_weight_yields_zero_confidence() {
        let participants = vec![voter("a", "A", 0.0, 0.0)];
        let r = WeightedVoting.reconcile(&participants);
        assert_eq!(r.position, "A");
        assert_eq!(r.confidence.mean, 0.0);
    }
}
