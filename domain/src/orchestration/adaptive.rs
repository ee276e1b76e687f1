//! Adaptive policy controller
//!
//! Watches a rolling window of recent outcomes and nudges the orchestrator's
//! defaults: the consensus method under persistently low confidence, and the
//! team-size upper bound under time pressure or low confidence.

use super::value_objects::{OrchestrationResult, PerformanceMetrics};
use crate::consensus::ConsensusMethod;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Below this average confidence the default method is advanced
pub const METHOD_SWITCH_CONFIDENCE: f64 = 0.7;
/// Below this average confidence the team may grow
pub const GROWTH_CONFIDENCE: f64 = 0.8;
/// Fraction of `max_time` that counts as time pressure
pub const TIME_PRESSURE_RATIO: f64 = 0.8;
pub const MAX_AGENTS_FLOOR: usize = 3;
pub const MAX_AGENTS_CEILING: usize = 15;

/// What the controller keeps from each successful call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub confidence: f64,
    pub total_time: Duration,
    pub team_size: usize,
}

impl From<&OrchestrationResult> for Outcome {
    fn from(result: &OrchestrationResult) -> Self {
        Self {
            confidence: result.confidence.mean,
            total_time: result.performance.total_time,
            team_size: result.performance.team_size,
        }
    }
}

/// Tunable defaults the controller may change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub method: ConsensusMethod,
    pub max_agents: usize,
}

/// Before/after view of one adaptation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyAdjustment {
    pub before: Policy,
    pub after: Policy,
}

impl PolicyAdjustment {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Debug, Clone)]
pub struct AdaptiveController {
    history: VecDeque<Outcome>,
    capacity: usize,
    window: usize,
    total_calls: u64,
    successful_calls: u64,
}

impl Default for AdaptiveController {
    fn default() -> Self {
        Self::new(100, 10)
    }
}

impl AdaptiveController {
    pub fn new(capacity: usize, window: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            window: window.max(1),
            total_calls: 0,
            successful_calls: 0,
        }
    }

    pub fn record_success(&mut self, outcome: Outcome) {
        self.total_calls += 1;
        self.successful_calls += 1;
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(outcome);
    }

    pub fn record_failure(&mut self) {
        self.total_calls += 1;
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn history(&self) -> impl Iterator<Item = &Outcome> {
        self.history.iter()
    }

    /// Clears history and counters.
    pub fn clear(&mut self) {
        self.history.clear();
        self.total_calls = 0;
        self.successful_calls = 0;
    }

    /// Compute the next policy from the most recent window.
    ///
    /// Does nothing until a full window of results is available. `max_time`
    /// is the time budget of the most recent request.
    pub fn adapt(&self, current: Policy, max_time: Duration) -> PolicyAdjustment {
        let mut after = current;

        if self.history.len() >= self.window {
            let recent = self.history.iter().skip(self.history.len() - self.window);
            let (confidence, time) = recent.fold((0.0, Duration::ZERO), |(c, t), o| {
                (c + o.confidence, t + o.total_time)
            });
            let n = self.window as f64;
            let avg_confidence = confidence / n;
            let avg_time = time.as_secs_f64() / n;

            if avg_confidence < METHOD_SWITCH_CONFIDENCE {
                after.method = current.method.next();
            }

            if avg_time > TIME_PRESSURE_RATIO * max_time.as_secs_f64() {
                after.max_agents = current.max_agents.saturating_sub(1).max(MAX_AGENTS_FLOOR);
            } else if avg_confidence < GROWTH_CONFIDENCE && current.max_agents < MAX_AGENTS_CEILING
            {
                after.max_agents = current.max_agents + 1;
            }
        }

        PolicyAdjustment {
            before: current,
            after,
        }
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        let success_rate = if self.total_calls == 0 {
            0.0
        } else {
            self.successful_calls as f64 / self.total_calls as f64
        };

        if self.history.is_empty() {
            return PerformanceMetrics {
                success_rate,
                total_calls: self.total_calls,
                ..Default::default()
            };
        }

        let n = self.history.len();
        let total_time: Duration = self.history.iter().map(|o| o.total_time).sum();
        let confidence: f64 = self.history.iter().map(|o| o.confidence).sum();
        let team: usize = self.history.iter().map(|o| o.team_size).sum();

        PerformanceMetrics {
            average_time: total_time / n as u32,
            average_confidence: confidence / n as f64,
            average_team_size: team as f64 / n as f64,
            success_rate,
            total_calls: self.total_calls,
            history_len: n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(confidence: f64, millis: u64) -> Outcome {
        Outcome {
            confidence,
            total_time: Duration::from_millis(millis),
            team_size: 3,
        }
    }

    fn policy() -> Policy {
        Policy {
            method: ConsensusMethod::SimpleMajority,
            max_agents: 7,
        }
    }

    const BUDGET: Duration = Duration::from_secs(10);

    #[test]
    fn test_low_confidence_window_advances_method_one_step() {
        let mut controller = AdaptiveController::default();
        for _ in 0..10 {
            controller.record_success(outcome(0.5, 100));
        }

        let adjustment = controller.adapt(policy(), BUDGET);
        assert_eq!(adjustment.after.method, ConsensusMethod::WeightedVoting);
        assert!(adjustment.changed());
    }

    #[test]
    fn test_partial_window_changes_nothing() {
        let mut controller = AdaptiveController::default();
        for _ in 0..9 {
            controller.record_success(outcome(0.1, 100));
        }
        let adjustment = controller.adapt(policy(), BUDGET);
        assert!(!adjustment.changed());
    }

    #[test]
    fn test_method_cycle_wraps() {
        let mut controller = AdaptiveController::default();
        for _ in 0..10 {
            controller.record_success(outcome(0.5, 100));
        }
        let current = Policy {
            method: ConsensusMethod::GameTheoretic,
            max_agents: 7,
        };
        let adjustment = controller.adapt(current, BUDGET);
        assert_eq!(adjustment.after.method, ConsensusMethod::SimpleMajority);
    }

    #[test]
    fn test_time_pressure_shrinks_team_with_floor() {
        let mut controller = AdaptiveController::default();
        for _ in 0..10 {
            controller.record_success(outcome(0.95, 9_000));
        }

        let adjustment = controller.adapt(policy(), BUDGET);
        assert_eq!(adjustment.after.max_agents, 6);
        assert_eq!(adjustment.after.method, ConsensusMethod::SimpleMajority);

        let at_floor = Policy {
            max_agents: 3,
            ..policy()
        };
        assert_eq!(controller.adapt(at_floor, BUDGET).after.max_agents, 3);
    }

    #[test]
    fn test_moderate_confidence_grows_team_up_to_ceiling() {
        let mut controller = AdaptiveController::default();
        for _ in 0..10 {
            controller.record_success(outcome(0.75, 100));
        }

        let adjustment = controller.adapt(policy(), BUDGET);
        assert_eq!(adjustment.after.max_agents, 8);
        assert_eq!(adjustment.after.method, ConsensusMethod::SimpleMajority);

        let at_ceiling = Policy {
            max_agents: 15,
            ..policy()
        };
        assert!(!controller.adapt(at_ceiling, BUDGET).changed());
    }

    #[test]
    fn test_only_latest_window_counts() {
        let mut controller = AdaptiveController::default();
        for _ in 0..10 {
            controller.record_success(outcome(0.1, 100));
        }
        for _ in 0..10 {
            controller.record_success(outcome(0.95, 100));
        }
        assert!(!controller.adapt(policy(), BUDGET).changed());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut controller = AdaptiveController::new(5, 2);
        for i in 0..8 {
            controller.record_success(outcome(i as f64 / 10.0, 100));
        }
        assert_eq!(controller.len(), 5);
        assert_eq!(controller.history().next().map(|o| o.confidence), Some(0.3));
    }

    #[test]
    fn test_metrics_include_failures_in_success_rate() {
        let mut controller = AdaptiveController::default();
        controller.record_success(outcome(0.8, 1000));
        controller.record_success(outcome(0.6, 3000));
        controller.record_failure();
        controller.record_failure();

        let metrics = controller.metrics();
        assert_eq!(metrics.total_calls, 4);
        assert_eq!(metrics.success_rate, 0.5);
        assert_eq!(metrics.average_time, Duration::from_millis(2000));
        assert!((metrics.average_confidence - 0.7).abs() < 1e-9);
        assert_eq!(metrics.average_team_size, 3.0);

        controller.clear();
        assert_eq!(controller.metrics(), PerformanceMetrics::default());
    }
}
