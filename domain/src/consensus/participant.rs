//! Consensus participants and contribution scoring

use super::position::{extract_position, position_confidence};
use crate::agent::Capability;
use crate::core::string::terms;
use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Reasoning depth (steps) at which the depth factor saturates
const DEPTH_CAP: f64 = 5.0;
/// Evidence count at which the evidence factor saturates
const EVIDENCE_CAP: f64 = 3.0;

/// Breakdown of a participant's contribution score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Query-term overlap between message and query
    pub relevance: f64,
    /// Reasoning depth, evidence count and confidence
    pub quality: f64,
    /// `1 - uncertainty.total`
    pub certainty: f64,
}

impl Contribution {
    pub fn assess(query: &str, message: &Message) -> Self {
        let query_terms = terms(query);
        let relevance = if query_terms.is_empty() {
            0.0
        } else {
            let message_terms = terms(&message.text());
            query_terms.intersection(&message_terms).count() as f64 / query_terms.len() as f64
        };

        let depth = (message.reasoning.steps.len() as f64 / DEPTH_CAP).min(1.0);
        let evidence = (message.evidence.len() as f64 / EVIDENCE_CAP).min(1.0);
        let confidence = message.reasoning.mean_confidence().unwrap_or(0.0);
        let quality = (depth + evidence + confidence) / 3.0;

        Self {
            relevance,
            quality,
            certainty: (1.0 - message.uncertainty.total).clamp(0.0, 1.0),
        }
    }

    /// Mean of the three factors, in [0, 1].
    pub fn score(&self) -> f64 {
        ((self.relevance + self.quality + self.certainty) / 3.0).clamp(0.0, 1.0)
    }
}

/// One agent's message paired with how much it should count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusParticipant {
    pub agent_id: String,
    pub capabilities: Vec<Capability>,
    pub message: Message,
    /// Contribution score in [0, 1]
    pub contribution: f64,
}

impl ConsensusParticipant {
    pub fn new(
        agent_id: impl Into<String>,
        capabilities: Vec<Capability>,
        message: Message,
        contribution: f64,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            capabilities,
            message,
            contribution: contribution.clamp(0.0, 1.0),
        }
    }

    /// Build a participant, scoring its message against the query.
    pub fn scored(
        agent_id: impl Into<String>,
        capabilities: Vec<Capability>,
        message: Message,
        query: &str,
    ) -> Self {
        let contribution = Contribution::assess(query, &message).score();
        Self::new(agent_id, capabilities, message, contribution)
    }

    pub fn position(&self) -> String {
        extract_position(&self.message)
    }

    pub fn confidence(&self) -> f64 {
        position_confidence(&self.message)
    }

    /// Voting weight: contribution × own confidence.
    pub fn weight(&self) -> f64 {
        self.contribution * self.confidence()
    }
}
