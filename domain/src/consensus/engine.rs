//! Consensus engine: runs one reconciliation method and applies the quality gate

use super::method::ConsensusMethod;
use super::methods::reconciler_for;
use super::participant::ConsensusParticipant;
use super::result::{ConsensusResult, Dissent, ParticipantSummary};
use crate::core::error::{ConsensusError, ConsensusQualityError};
use crate::core::string::truncate;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default length of a dissent reasoning excerpt, in bytes
const DEFAULT_EXCERPT_LEN: usize = 200;

static RESULT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Reconciles a team's participants into a [`ConsensusResult`]
#[derive(Debug, Clone, Copy)]
pub struct ConsensusEngine {
    excerpt_len: usize,
}

impl Default for ConsensusEngine {
    fn default() -> Self {
        Self {
            excerpt_len: DEFAULT_EXCERPT_LEN,
        }
    }
}

impl ConsensusEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excerpt_len(mut self, len: usize) -> Self {
        self.excerpt_len = len;
        self
    }

    /// Run `method`, then reject results below `threshold`.
    pub fn run(
        &self,
        method: ConsensusMethod,
        participants: &[ConsensusParticipant],
        threshold: f64,
    ) -> Result<ConsensusResult, ConsensusError> {
        let result = self.reconcile(method, participants)?;
        Self::ensure_quality(&result, threshold)?;
        Ok(result)
    }

    /// Run `method` without the quality gate.
    pub fn reconcile(
        &self,
        method: ConsensusMethod,
        participants: &[ConsensusParticipant],
    ) -> Result<ConsensusResult, ConsensusError> {
        if participants.is_empty() {
            return Err(ConsensusError::NoParticipants);
        }

        let reconciliation = reconciler_for(method).reconcile(participants);

        let summaries: Vec<ParticipantSummary> = participants
            .iter()
            .map(|p| ParticipantSummary {
                agent_id: p.agent_id.clone(),
                capabilities: p.capabilities.clone(),
                contribution: p.contribution,
                position: p.position(),
                confidence: p.confidence(),
            })
            .collect();

        let dissent = participants
            .iter()
            .zip(&summaries)
            .filter(|(_, summary)| summary.position != reconciliation.position)
            .map(|(p, summary)| Dissent {
                agent_id: p.agent_id.clone(),
                position: summary.position.clone(),
                reasoning: truncate(&p.message.text(), self.excerpt_len),
            })
            .collect();

        let timestamp = current_timestamp();
        Ok(ConsensusResult {
            id: format!(
                "consensus-{}-{}",
                timestamp,
                RESULT_SEQ.fetch_add(1, Ordering::Relaxed)
            ),
            consensus: reconciliation.position,
            confidence: reconciliation.confidence,
            participants: summaries,
            dissent,
            method,
            timestamp,
            aggregate_beliefs: reconciliation.aggregate_beliefs,
        })
    }

    /// Fail when the consensus confidence is below `threshold`.
    pub fn ensure_quality(
        result: &ConsensusResult,
        threshold: f64,
    ) -> Result<(), ConsensusQualityError> {
        if result.confidence.mean < threshold {
            return Err(ConsensusQualityError {
                method: result.method,
                confidence: result.confidence.mean,
                threshold,
            });
        }
        Ok(())
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
