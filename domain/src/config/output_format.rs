//! Output format value object

use serde::{Deserialize, Serialize};

/// How an orchestration result is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Response, confidence and dissent only (default)
    #[default]
    Summary,
    /// Everything: reasoning, evidence, participants and performance
    Full,
    /// JSON output
    Json,
}
