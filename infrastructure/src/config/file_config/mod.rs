//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod logging;
mod orchestrator;
mod output;
mod providers;

pub use logging::FileLoggingConfig;
pub use orchestrator::FileOrchestratorConfig;
pub use output::FileOutputConfig;
pub use providers::FileProviderConfig;

use ensemble_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Team sizing, quorum and consensus settings
    pub orchestrator: FileOrchestratorConfig,
    /// Model providers, in binding order
    pub providers: Vec<FileProviderConfig>,
    /// Event transcript settings
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Orchestrator bounds, thresholds and the consensus method name
    /// 2. That at least one provider is configured
    /// 3. Each provider's model list and concurrency
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.orchestrator.to_orchestrator_config().1;

        if self.providers.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoProviders,
                "no [[providers]] configured",
            ));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if !seen.insert(provider.id.as_str()) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::DuplicateProviderId,
                    format!("providers.{}: duplicate provider id", provider.id),
                ));
            }
            issues.extend(provider.validate());
        }

        issues
    }
}
