use super::{Reconciler, Reconciliation};
use crate::consensus::method::ConsensusMethod;
use crate::consensus::participant::ConsensusParticipant;
use crate::consensus::position::tally;
use crate::message::ConfidenceInterval;

/// Payoff when two participants play the same strategy
const COORDINATION_PAYOFF: f64 = 1.0;
/// Payoff when they play different strategies
const MISCOORDINATION_PAYOFF: f64 = -0.5;
/// Absolute half-width of the reported interval
const BAND: f64 = 0.1;

/// Bounded approximation of equilibrium selection in a coordination game.
///
/// Every distinct position is a pure strategy. A strategy's score is its
/// average row payoff against the realized profile (every participant's
/// actual position, its own included). The best-scoring strategy wins and
/// confidence is `(best + 1) / 2`.
///
/// This is not a game solver: it never searches mixed strategies or
/// checks deviations, and the quadratic scoring is only sensible for the
/// handful of distinct positions a team produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameTheoretic;

impl GameTheoretic {
    /// Average row payoff of each distinct strategy, in first-seen order.
    pub fn strategy_payoffs(positions: &[String]) -> Vec<(String, f64)> {
        let n = positions.len().max(1) as f64;
        tally(positions.iter().map(String::as_str))
            .into_iter()
            .map(|(strategy, _)| {
                let total: f64 = positions
                    .iter()
                    .map(|other| {
                        if *other == strategy {
                            COORDINATION_PAYOFF
                        } else {
                            MISCOORDINATION_PAYOFF
                        }
                    })
                    .sum();
                (strategy, total / n)
            })
            .collect()
    }
}

impl Reconciler for GameTheoretic {
    fn method(&self) -> ConsensusMethod {
        ConsensusMethod::GameTheoretic
    }

    fn reconcile(&self, participants: &[ConsensusParticipant]) -> Reconciliation {
        let positions: Vec<String> = participants.iter().map(|p| p.position()).collect();
        let payoffs = Self::strategy_payoffs(&positions);

        let (winner, best) = payoffs
            .iter()
            .fold(None::<&(String, f64)>, |best, entry| match best {
                Some(b) if b.1 >= entry.1 => Some(b),
                _ => Some(entry),
            })
            .map(|(p, v)| (p.clone(), *v))
            .unwrap_or((String::new(), MISCOORDINATION_PAYOFF));

        Reconciliation::new(
            winner,
            ConfidenceInterval::banded((best + 1.0) / 2.0, BAND, self.method().as_str()),
        )
    }
}
