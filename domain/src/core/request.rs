//! Orchestration request value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Free-form context passed alongside the query.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// Limits and requirements a caller places on one orchestration call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Upper bound on the fan-in wait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<Duration>,
    /// Budget for the (estimated) provider cost
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cost: Option<f64>,
    /// Minimum acceptable consensus confidence (0.0 to 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
    /// Kinds of evidence the answer must be backed by
    #[serde(default)]
    pub required_evidence: Vec<String>,
}

impl Constraints {
    /// Number of constraints the caller actually declared.
    pub fn declared_count(&self) -> usize {
        [
            self.max_time.is_some(),
            self.max_cost.is_some(),
            self.min_confidence.is_some(),
            !self.required_evidence.is_empty(),
        ]
        .into_iter()
        .filter(|declared| *declared)
        .count()
    }
}

/// Caller identity and session history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub previous_queries: Vec<String>,
}

/// A query to be answered by an agent team (Value Object)
///
/// Immutable for the duration of one orchestration call; the orchestrator
/// only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationRequest {
    pub query: String,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub metadata: RequestMetadata,
}

impl OrchestrationRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            context: Context::new(),
            constraints: Constraints::default(),
            metadata: RequestMetadata::default(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.constraints.max_time = Some(max_time);
        self
    }

    pub fn with_max_cost(mut self, max_cost: f64) -> Self {
        self.constraints.max_cost = Some(max_cost);
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.constraints.min_confidence = Some(min_confidence);
        self
    }

    pub fn with_required_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.constraints.required_evidence.push(evidence.into());
        self
    }

    pub fn with_metadata(mut self, metadata: RequestMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Minimum confidence requested by the caller, 0.0 when unset.
    pub fn min_confidence(&self) -> f64 {
        self.constraints.min_confidence.unwrap_or(0.0)
    }

    /// Size of the context once serialized, in bytes.
    pub fn context_size(&self) -> usize {
        serde_json::to_string(&self.context)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Reject requests no team could answer meaningfully.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.query.trim().is_empty() {
            return Err(DomainError::InvalidRequest(
                "query cannot be empty".to_string(),
            ));
        }
        if let Some(min) = self.constraints.min_confidence
            && !(0.0..=1.0).contains(&min)
        {
            return Err(DomainError::InvalidConstraint {
                name: "min_confidence",
                reason: format!("{} is outside [0, 1]", min),
            });
        }
        if let Some(max_time) = self.constraints.max_time
            && max_time.is_zero()
        {
            return Err(DomainError::InvalidConstraint {
                name: "max_time",
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(cost) = self.constraints.max_cost
            && cost < 0.0
        {
            return Err(DomainError::InvalidConstraint {
                name: "max_cost",
                reason: format!("{} is negative", cost),
            });
        }
        Ok(())
    }
}
