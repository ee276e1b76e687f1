//! Work distributor
//!
//! Sends the same query to every team member, each with a context colored
//! by the member's focus and position in the team, and gathers whatever
//! comes back before the deadline.

use super::pool::ActiveAgent;
use crate::ports::event_logger::{AGENT_FAILED, EventLogger, OrchestrationEvent};
use crate::ports::llm_provider::ModelInterface;
use crate::ports::progress::ProgressNotifier;
use crate::ports::reasoning_agent::ReasoningAgent;
use ensemble_domain::{Capability, ConsensusParticipant, Context, QuorumError, Stage};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{Id, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Raised when the caller cancels while agents are still running
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Dispatch cancelled")]
pub struct Cancelled;

/// One agent's share of the work
pub struct Assignment {
    pub agent_id: String,
    pub agent: Arc<dyn ReasoningAgent>,
    pub capabilities: Vec<Capability>,
    pub context: Context,
    pub model: ModelInterface,
}

/// An agent that produced no usable result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentFailure {
    pub agent_id: String,
    pub reason: String,
}

/// Everything that settled during fan-in
#[derive(Debug, Default)]
pub struct Gathered {
    /// In team order
    pub participants: Vec<ConsensusParticipant>,
    pub failures: Vec<AgentFailure>,
}

impl Gathered {
    pub fn participant_ids(&self) -> impl Iterator<Item = &str> {
        self.participants.iter().map(|p| p.agent_id.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WorkDistributor {
    min_participants: usize,
}

impl WorkDistributor {
    pub fn new(min_participants: usize) -> Self {
        Self { min_participants }
    }

    /// Build one assignment per team member.
    pub fn plan(base: &Context, team: &[&ActiveAgent]) -> Vec<Assignment> {
        team.iter()
            .enumerate()
            .map(|(index, member)| {
                let capabilities: Vec<Capability> =
                    member.specialization().iter().copied().collect();
                Assignment {
                    agent_id: member.id().to_string(),
                    agent: member.agent(),
                    context: Self::specialize(
                        base,
                        member.focus(),
                        index,
                        team.len(),
                        &capabilities,
                    ),
                    capabilities,
                    model: member.model_interface(),
                }
            })
            .collect()
    }

    /// The request context plus the member's focus and team position.
    pub fn specialize(
        base: &Context,
        focus: Capability,
        index: usize,
        team_size: usize,
        capabilities: &[Capability],
    ) -> Context {
        let mut context = base.clone();
        context.insert("focus".into(), Value::from(focus.as_str()));
        context.insert("perspective_index".into(), Value::from(index));
        context.insert("team_size".into(), Value::from(team_size));
        context.insert(
            "capabilities".into(),
            Value::from(capabilities.iter().map(|c| c.as_str()).collect::<Vec<_>>()),
        );
        context
    }

    /// Run every assignment concurrently and gather results until all settle,
    /// the deadline passes, or `cancel` fires.
    ///
    /// Agent errors and late agents are recorded as failures; they never
    /// abort the batch. No retries happen here.
    pub async fn dispatch(
        &self,
        query: &str,
        assignments: Vec<Assignment>,
        deadline: Instant,
        cancel: &CancellationToken,
        progress: &dyn ProgressNotifier,
        events: &dyn EventLogger,
    ) -> Result<Gathered, Cancelled> {
        let stage = Stage::Dispatch;
        let total = assignments.len();
        info!("Dispatching query to {} agents", total);

        let mut pending: BTreeMap<usize, String> = BTreeMap::new();
        let mut capabilities: BTreeMap<usize, Vec<Capability>> = BTreeMap::new();
        let mut tasks: HashMap<Id, usize> = HashMap::new();
        let mut join_set = JoinSet::new();

        for (index, assignment) in assignments.into_iter().enumerate() {
            pending.insert(index, assignment.agent_id.clone());
            capabilities.insert(index, assignment.capabilities);
            let query = query.to_string();
            let Assignment {
                agent,
                context,
                model,
                ..
            } = assignment;

            let handle = join_set.spawn(async move {
                let result = agent.process_query(&query, &context, &model).await;
                (index, result)
            });
            tasks.insert(handle.id(), index);
        }

        let mut settled = Vec::new();
        let mut failures = Vec::new();
        let sleep = tokio::time::sleep_until(deadline);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Dispatch cancelled with {} agents outstanding", pending.len());
                    join_set.abort_all();
                    return Err(Cancelled);
                }
                _ = &mut sleep => {
                    warn!("Deadline reached with {} agents outstanding", pending.len());
                    join_set.abort_all();
                    break;
                }
                joined = join_set.join_next() => match joined {
                    None => break,
                    Some(Ok((index, Ok(message)))) => {
                        if let Some(agent_id) = pending.remove(&index) {
                            debug!("Agent {} responded", agent_id);
                            progress.on_agent_complete(&stage, &agent_id, true);
                            settled.push((index, agent_id, message));
                        }
                    }
                    Some(Ok((index, Err(e)))) => {
                        if let Some(agent_id) = pending.remove(&index) {
                            warn!("Agent {} failed: {}", agent_id, e);
                            progress.on_agent_complete(&stage, &agent_id, false);
                            failures.push(AgentFailure { agent_id, reason: e.to_string() });
                        }
                    }
                    Some(Err(e)) => {
                        warn!("Task join error: {}", e);
                        if let Some(agent_id) = tasks
                            .get(&e.id())
                            .and_then(|index| pending.remove(index))
                        {
                            progress.on_agent_complete(&stage, &agent_id, false);
                            failures.push(AgentFailure {
                                agent_id,
                                reason: format!("agent task failed: {e}"),
                            });
                        }
                    }
                },
            }
        }

        // late
        for (_, agent_id) in std::mem::take(&mut pending) {
            progress.on_agent_complete(&stage, &agent_id, false);
            failures.push(AgentFailure {
                agent_id,
                reason: "no result before deadline".to_string(),
            });
        }

        for failure in &failures {
            events.log(OrchestrationEvent::new(
                AGENT_FAILED,
                json!({ "agent_id": failure.agent_id, "reason": failure.reason }),
            ));
        }

        settled.sort_by_key(|(index, _, _)| *index);
        let participants = settled
            .into_iter()
            .map(|(index, agent_id, message)| {
                let caps = capabilities.remove(&index).unwrap_or_default();
                ConsensusParticipant::scored(agent_id, caps, message, query)
            })
            .collect::<Vec<_>>();

        info!(
            "Gathered {} of {} results ({} failed)",
            participants.len(),
            total,
            failures.len()
        );
        Ok(Gathered {
            participants,
            failures,
        })
    }

    /// Fail unless at least `min_participants` results survived.
    pub fn ensure_quorum(&self, gathered: &Gathered) -> Result<(), QuorumError> {
        let received = gathered.participants.len();
        if received < self.min_participants {
            return Err(QuorumError {
                required: self.min_participants,
                received,
            });
        }
        Ok(())
    }
}
