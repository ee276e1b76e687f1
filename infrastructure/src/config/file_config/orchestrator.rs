//! Orchestrator configuration from TOML (`[orchestrator]` section)

use ensemble_application::OrchestratorConfig;
use ensemble_domain::{ConfigIssue, ConfigIssueCode, ConsensusMethod};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw orchestrator configuration from TOML
///
/// Mirrors [`OrchestratorConfig`] with TOML-friendly types: the consensus
/// method is a name and the deadline is in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    pub min_agents: usize,
    pub max_agents: usize,
    pub min_participants: usize,
    pub quality_threshold: f64,
    /// "simple_majority", "weighted_voting", "bayesian_aggregation", "game_theoretic"
    pub default_method: String,
    pub default_max_time_secs: u64,
    pub idle_pool_capacity: usize,
    pub workload_cap: usize,
    pub history_capacity: usize,
    pub adaptation_window: usize,
    pub max_predictions: usize,
}

impl Default for FileOrchestratorConfig {
    fn default() -> Self {
        let defaults = OrchestratorConfig::default();
        Self {
            min_agents: defaults.min_agents,
            max_agents: defaults.max_agents,
            min_participants: defaults.min_participants,
            quality_threshold: defaults.quality_threshold,
            default_method: defaults.default_method.to_string(),
            default_max_time_secs: defaults.default_max_time.as_secs(),
            idle_pool_capacity: defaults.idle_pool_capacity,
            workload_cap: defaults.workload_cap,
            history_capacity: defaults.history_capacity,
            adaptation_window: defaults.adaptation_window,
            max_predictions: defaults.max_predictions,
        }
    }
}

impl FileOrchestratorConfig {
    /// Parse the consensus method name.
    ///
    /// Returns the default method plus an issue when the name is unknown.
    pub fn parse_method(&self) -> (ConsensusMethod, Vec<ConfigIssue>) {
        match self.default_method.parse::<ConsensusMethod>() {
            Ok(method) => (method, vec![]),
            Err(_) => (
                ConsensusMethod::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::UnknownConsensusMethod,
                    format!(
                        "orchestrator.default_method: unknown value '{}' (expected simple_majority, weighted_voting, bayesian_aggregation or game_theoretic)",
                        self.default_method
                    ),
                )],
            ),
        }
    }

    /// Convert to the application config, collecting every issue found.
    pub fn to_orchestrator_config(&self) -> (OrchestratorConfig, Vec<ConfigIssue>) {
        let (method, mut issues) = self.parse_method();

        let config = OrchestratorConfig::default()
            .with_team_bounds(self.min_agents, self.max_agents)
            .with_min_participants(self.min_participants)
            .with_quality_threshold(self.quality_threshold)
            .with_default_method(method)
            .with_default_max_time(Duration::from_secs(self.default_max_time_secs))
            .with_idle_pool_capacity(self.idle_pool_capacity)
            .with_workload_cap(self.workload_cap)
            .with_history(self.history_capacity, self.adaptation_window)
            .with_max_predictions(self.max_predictions);

        issues.extend(config.validate());
        (config, issues)
    }
}
