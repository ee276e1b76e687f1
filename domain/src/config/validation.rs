//! Structured configuration issues.
//!
//! Both the orchestrator settings and the file configuration report problems
//! as a list of [`ConfigIssue`]s rather than failing on the first one, so the
//! CLI can print every warning and refuse to start only on errors.

use serde::Serialize;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigIssueCode {
    /// `min_agents` is larger than `max_agents`.
    TeamBoundsInverted,
    /// `min_participants` is zero, so any empty result set would pass quorum.
    NoQuorum,
    /// Quorum can never be met with the largest allowed team.
    QuorumUnreachable,
    /// Quality threshold outside [0, 1].
    ThresholdOutOfRange,
    /// Consensus method name not recognized.
    UnknownConsensusMethod,
    /// No providers configured.
    NoProviders,
    /// Two providers share an id.
    DuplicateProviderId,
    /// A provider declares no models.
    EmptyModelList,
    /// A provider allows zero concurrent requests.
    NoConcurrency,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

/// True when any issue is fatal.
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(ConfigIssue::is_error)
}
