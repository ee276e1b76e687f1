//! Agent pool manager
//!
//! Owns the active agents and the idle pool of one orchestrator. Teams are
//! assembled by reusing active agents that already cover the request, then
//! reviving idle agents, then building new ones through the [`AgentFactory`].

use super::orchestrate::StageFailure;
use crate::ports::event_logger::{AGENT_REUSED, AGENT_SPAWNED, EventLogger, OrchestrationEvent};
use crate::ports::llm_provider::{ModelInterface, ProviderHandle};
use crate::ports::reasoning_agent::{AgentFactory, ReasoningAgent};
use ensemble_domain::{AgentTemplate, Capability, ModelSpec, RequestComplexity, TemplateRegistry};
use serde_json::json;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

/// An agent owned by the pool, bound to one provider and model
pub struct ActiveAgent {
    agent: Arc<dyn ReasoningAgent>,
    template_id: String,
    provider: ProviderHandle,
    model: ModelSpec,
    workload: usize,
    specialization: BTreeSet<Capability>,
    focus: Capability,
}

impl ActiveAgent {
    fn new(
        agent: Arc<dyn ReasoningAgent>,
        template: &AgentTemplate,
        provider: ProviderHandle,
        model: ModelSpec,
    ) -> Self {
        Self {
            agent,
            template_id: template.id.clone(),
            provider,
            model,
            workload: 0,
            specialization: template.tags(),
            focus: template.primary().unwrap_or(Capability::Reasoning),
        }
    }

    pub fn id(&self) -> &str {
        self.agent.id()
    }

    pub fn agent(&self) -> Arc<dyn ReasoningAgent> {
        Arc::clone(&self.agent)
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    pub fn model(&self) -> &ModelSpec {
        &self.model
    }

    /// Assignments this agent has completed since it was spawned or revived
    pub fn workload(&self) -> usize {
        self.workload
    }

    pub fn specialization(&self) -> &BTreeSet<Capability> {
        &self.specialization
    }

    /// The capability this agent's sub-query is colored by
    pub fn focus(&self) -> Capability {
        self.focus
    }

    pub fn model_interface(&self) -> ModelInterface {
        ModelInterface::new(self.provider.clone(), self.model.clone())
    }

    fn covers(&self, required: &BTreeSet<Capability>) -> bool {
        self.specialization.is_superset(required)
    }
}

impl std::fmt::Debug for ActiveAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveAgent")
            .field("id", &self.id())
            .field("template_id", &self.template_id)
            .field("provider", &self.provider_id())
            .field("model", &self.model.id)
            .field("workload", &self.workload)
            .finish()
    }
}

/// The team assembled for one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    /// Agent ids, in team order
    pub members: Vec<String>,
    pub reused: usize,
    pub revived: usize,
    pub spawned: usize,
}

pub struct AgentPoolManager {
    templates: TemplateRegistry,
    providers: Vec<ProviderHandle>,
    factory: Arc<dyn AgentFactory>,
    active: Vec<ActiveAgent>,
    idle: VecDeque<ActiveAgent>,
    idle_capacity: usize,
    workload_cap: usize,
    next_seq: u64,
}

impl AgentPoolManager {
    pub fn new(
        templates: TemplateRegistry,
        providers: Vec<ProviderHandle>,
        factory: Arc<dyn AgentFactory>,
    ) -> Self {
        Self {
            templates,
            providers,
            factory,
            active: Vec::new(),
            idle: VecDeque::new(),
            idle_capacity: 20,
            workload_cap: 3,
            next_seq: 1,
        }
    }

    pub fn with_idle_capacity(mut self, capacity: usize) -> Self {
        self.idle_capacity = capacity;
        self
    }

    pub fn with_workload_cap(mut self, cap: usize) -> Self {
        self.workload_cap = cap;
        self
    }

    pub fn active(&self) -> &[ActiveAgent] {
        &self.active
    }

    pub fn idle_len(&self) -> usize {
        self.idle.len()
    }

    pub fn get(&self, agent_id: &str) -> Option<&ActiveAgent> {
        self.active.iter().find(|a| a.id() == agent_id)
    }

    /// Assemble a team of `complexity.recommended_team_size` agents.
    ///
    /// Active agents below the workload cap whose tags cover the required
    /// capabilities are reused first. Only agents that survived the last
    /// [`cleanup`](Self::cleanup) are active, which takes two or more
    /// recorded results since they joined. A revived agent starts at
    /// workload 0, so back-to-back orchestrations retire and revive their
    /// members rather than reusing them; reuse applies when a caller
    /// assembles again before cleaning up. Remaining seats are filled from
    /// the idle pool, then by spawning from templates.
    pub async fn assemble(
        &mut self,
        complexity: &RequestComplexity,
        events: &dyn EventLogger,
    ) -> Result<Assembly, StageFailure> {
        let required = complexity.capability_set();
        let size = complexity.recommended_team_size;
        let mut assembly = Assembly::default();

        for agent in &self.active {
            if assembly.members.len() == size {
                break;
            }
            if agent.workload < self.workload_cap && agent.covers(&required) {
                debug!("Reusing agent {} (workload {})", agent.id(), agent.workload);
                events.log(OrchestrationEvent::new(
                    AGENT_REUSED,
                    json!({
                        "agent_id": agent.id(),
                        "template": agent.template_id,
                        "workload": agent.workload,
                    }),
                ));
                assembly.members.push(agent.id().to_string());
                assembly.reused += 1;
            }
        }

        let mut represented: BTreeSet<String> = assembly
            .members
            .iter()
            .filter_map(|id| self.get(id))
            .map(|a| a.template_id.clone())
            .collect();

        while assembly.members.len() < size {
            let template = self
                .choose_template(&required, &represented, assembly.members.len())
                .cloned()
                .ok_or(StageFailure::NoTemplates)?;
            let (provider, model) = self.bind()?;

            let (agent, revived) = match self.take_idle(&template.id) {
                Some(mut idle) => {
                    idle.agent.reset();
                    idle.workload = 0;
                    idle.provider = provider;
                    idle.model = model;
                    (idle, true)
                }
                None => {
                    let id = format!("{}-{}", template.id, self.next_seq);
                    self.next_seq += 1;
                    let instance = self
                        .factory
                        .create(&id, &template)
                        .await
                        .map_err(StageFailure::AgentConstruction)?;
                    (ActiveAgent::new(instance, &template, provider, model), false)
                }
            };

            debug!(
                "{} agent {} from template {} on {}/{}",
                if revived { "Revived" } else { "Spawned" },
                agent.id(),
                template.id,
                agent.provider_id(),
                agent.model.id
            );
            events.log(OrchestrationEvent::new(
                AGENT_SPAWNED,
                json!({
                    "agent_id": agent.id(),
                    "template": template.id,
                    "provider": agent.provider_id(),
                    "model": agent.model.id,
                    "revived": revived,
                }),
            ));

            if revived {
                assembly.revived += 1;
            } else {
                assembly.spawned += 1;
            }
            represented.insert(template.id.clone());
            assembly.members.push(agent.id().to_string());
            self.active.push(agent);
        }

        info!(
            "Assembled team of {} ({} reused, {} revived, {} spawned)",
            assembly.members.len(),
            assembly.reused,
            assembly.revived,
            assembly.spawned
        );
        Ok(assembly)
    }

    /// Count one completed assignment for each agent that produced a result.
    pub fn record_results<'a, I>(&mut self, agent_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in agent_ids {
            if let Some(agent) = self.active.iter_mut().find(|a| a.id() == id) {
                agent.workload += 1;
            }
        }
    }

    /// Move lightly used agents (workload ≤ 1) into the idle pool.
    ///
    /// Returns how many agents were moved.
    pub fn cleanup(&mut self) -> usize {
        let (retired, kept): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|a| a.workload <= 1);
        self.active = kept;

        let moved = retired.len();
        for agent in retired {
            if self.idle_capacity == 0 {
                break;
            }
            if self.idle.len() == self.idle_capacity
                && let Some(evicted) = self.idle.pop_front()
            {
                debug!("Evicting idle agent {}", evicted.id());
            }
            self.idle.push_back(agent);
        }

        debug!(
            "Pool cleanup: {} moved to idle, {} active, {} idle",
            moved,
            self.active.len(),
            self.idle.len()
        );
        moved
    }

    /// Reset every pooled and active agent and empty the pool.
    pub fn reset(&mut self) {
        for agent in self.active.iter().chain(self.idle.iter()) {
            agent.agent.reset();
        }
        self.active.clear();
        self.idle.clear();
    }

    /// Highest-scoring template; ties go to the first one found when
    /// scanning the registry from `team_len` round-robin.
    fn choose_template(
        &self,
        required: &BTreeSet<Capability>,
        represented: &BTreeSet<String>,
        team_len: usize,
    ) -> Option<&AgentTemplate> {
        let templates = self.templates.as_slice();
        if templates.is_empty() {
            return None;
        }

        let start = team_len % templates.len();
        (0..templates.len())
            .map(|offset| &templates[(start + offset) % templates.len()])
            .fold(None::<(usize, &AgentTemplate)>, |best, t| {
                let score =
                    t.matching_count(required) + usize::from(!represented.contains(&t.id));
                match best {
                    Some((s, _)) if s >= score => best,
                    _ => Some((score, t)),
                }
            })
            .map(|(_, t)| t)
    }

    /// Least-loaded provider (aggregate workload, then bound agent count),
    /// and its most capable model. Providers without models are skipped.
    fn bind(&self) -> Result<(ProviderHandle, ModelSpec), StageFailure> {
        self.providers
            .iter()
            .filter_map(|handle| {
                let model = handle.best_model()?;
                let bound = self
                    .active
                    .iter()
                    .filter(|a| a.provider_id() == handle.id());
                let load = bound.clone().map(|a| a.workload).sum::<usize>();
                Some(((load, bound.count()), handle, model))
            })
            .fold(None::<((usize, usize), &ProviderHandle, &ModelSpec)>, |best, c| match best {
                Some(b) if b.0 <= c.0 => Some(b),
                _ => Some(c),
            })
            .map(|(_, handle, model)| (handle.clone(), model.clone()))
            .ok_or(StageFailure::NoProviders)
    }

    fn take_idle(&mut self, template_id: &str) -> Option<ActiveAgent> {
        let index = self.idle.iter().position(|a| a.template_id == template_id)?;
        self.idle.remove(index)
    }
}
