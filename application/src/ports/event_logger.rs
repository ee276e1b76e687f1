//! Port for structured orchestration event logging.
//!
//! Defines the [`EventLogger`] trait for recording what happened during each
//! call (team assembly, agent failures, consensus, policy changes) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable transcript (JSONL).

use serde_json::Value;

pub const ORCHESTRATION_STARTED: &str = "orchestration_started";
pub const AGENT_SPAWNED: &str = "agent_spawned";
pub const AGENT_REUSED: &str = "agent_reused";
pub const AGENT_FAILED: &str = "agent_failed";
pub const CONSENSUS_REACHED: &str = "consensus_reached";
pub const ORCHESTRATION_COMPLETED: &str = "orchestration_completed";
pub const ORCHESTRATION_FAILED: &str = "orchestration_failed";
pub const POLICY_ADJUSTED: &str = "policy_adjusted";

/// A structured orchestration event.
///
/// Each event has a type string and a JSON payload with event-specific
/// fields. The timestamp is added by the logger.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationEvent {
    /// Event type identifier (e.g., "agent_spawned", "consensus_reached").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl OrchestrationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging orchestration events to a structured log.
///
/// `log` is synchronous and infallible; implementations swallow their own
/// write errors so logging never affects an orchestration result.
pub trait EventLogger: Send + Sync {
    /// Record an orchestration event.
    fn log(&self, event: OrchestrationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoEventLogger;

impl EventLogger for NoEventLogger {
    fn log(&self, _event: OrchestrationEvent) {}
}
