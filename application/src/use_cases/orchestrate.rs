//! Orchestrate use case
//!
//! Runs one request through the full pipeline: complexity analysis, team
//! assembly, parallel dispatch, consensus and synthesis. Pool cleanup and
//! policy adaptation follow every call, whatever its outcome.

use super::distribute::WorkDistributor;
use super::pool::{ActiveAgent, AgentPoolManager};
use crate::config::OrchestratorConfig;
use crate::ports::event_logger::{
    CONSENSUS_REACHED, EventLogger, NoEventLogger, ORCHESTRATION_COMPLETED, ORCHESTRATION_FAILED,
    ORCHESTRATION_STARTED, OrchestrationEvent, POLICY_ADJUSTED,
};
use crate::ports::llm_provider::{LlmProvider, ProviderHandle};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::reasoning_agent::{AgentError, AgentFactory};
use ensemble_domain::core::string::truncate;
use ensemble_domain::{
    AdaptiveController, ComplexityAnalyzer, ConsensusEngine, ConsensusError,
    ConsensusMethod, ConsensusQualityError, DomainError, OrchestrationRequest, OrchestrationResult,
    Outcome, PerformanceMetrics, PerformanceReport, Policy, QuorumError, ResponseSynthesizer,
    Stage, TemplateRegistry, estimate_tokens,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Stand-in deadline when `started + max_time` overflows the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// What went wrong inside a stage
#[derive(Error, Debug)]
pub enum StageFailure {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("No agent templates registered")]
    NoTemplates,

    #[error("No provider declares a usable model")]
    NoProviders,

    #[error("Agent construction failed: {0}")]
    AgentConstruction(#[source] AgentError),

    #[error("Cancelled")]
    Cancelled,

    #[error("Consensus engine failed: {0}")]
    Consensus(#[source] ConsensusError),
}

/// A stage failure together with the request that triggered it
#[derive(Error, Debug)]
#[error("Orchestration failed during {stage}: {cause}")]
pub struct OrchestrationError {
    pub stage: Stage,
    pub request: Box<OrchestrationRequest>,
    #[source]
    pub cause: StageFailure,
}

impl OrchestrationError {
    pub fn new(stage: Stage, request: &OrchestrationRequest, cause: StageFailure) -> Self {
        Self {
            stage,
            request: Box::new(request.clone()),
            cause,
        }
    }
}

/// Errors returned by [`Orchestrator::orchestrate`]
#[derive(Error, Debug)]
pub enum OrchestrateError {
    #[error(transparent)]
    Quorum(#[from] QuorumError),

    #[error(transparent)]
    ConsensusQuality(#[from] ConsensusQualityError),

    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),
}

impl OrchestrateError {
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestrateError::Quorum(_) => "quorum",
            OrchestrateError::ConsensusQuality(_) => "consensus_quality",
            OrchestrateError::Orchestration(_) => "orchestration",
        }
    }
}

/// Multi-agent orchestrator
///
/// Owns its agent pool, history and adaptive defaults. `orchestrate` takes
/// `&mut self`, so one instance serves one call at a time; wrap it in a
/// [`SharedOrchestrator`] to serve concurrent callers.
pub struct Orchestrator {
    config: OrchestratorConfig,
    pool: AgentPoolManager,
    engine: ConsensusEngine,
    synthesizer: ResponseSynthesizer,
    controller: AdaptiveController,
    progress: Arc<dyn ProgressNotifier>,
    events: Arc<dyn EventLogger>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        templates: TemplateRegistry,
        providers: Vec<Arc<dyn LlmProvider>>,
        factory: Arc<dyn AgentFactory>,
    ) -> Self {
        let handles = providers.into_iter().map(ProviderHandle::new).collect();
        let pool = AgentPoolManager::new(templates, handles, factory)
            .with_idle_capacity(config.idle_pool_capacity)
            .with_workload_cap(config.workload_cap);

        Self {
            pool,
            engine: ConsensusEngine::new(),
            synthesizer: ResponseSynthesizer::new(config.max_predictions),
            controller: AdaptiveController::new(config.history_capacity, config.adaptation_window),
            progress: Arc::new(NoProgress),
            events: Arc::new(NoEventLogger),
            config,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_event_logger(mut self, events: Arc<dyn EventLogger>) -> Self {
        self.events = events;
        self
    }

    /// Current configuration, including adapted defaults.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn pool(&self) -> &AgentPoolManager {
        &self.pool
    }

    pub async fn orchestrate(
        &mut self,
        request: OrchestrationRequest,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        self.orchestrate_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Like [`orchestrate`](Self::orchestrate), but `cancel` aborts
    /// outstanding agents and fails the call.
    pub async fn orchestrate_with_cancel(
        &mut self,
        request: OrchestrationRequest,
        cancel: CancellationToken,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        let started = Instant::now();
        self.events.log(OrchestrationEvent::new(
            ORCHESTRATION_STARTED,
            json!({
                "query": truncate(&request.query, 200),
                "max_time_ms": self
                    .config
                    .effective_max_time(request.constraints.max_time)
                    .as_millis() as u64,
                "min_confidence": request.min_confidence(),
            }),
        ));

        let outcome = self.run(&request, &cancel, started).await;

        self.pool.cleanup();

        match &outcome {
            Ok(result) => {
                self.controller.record_success(Outcome::from(result));
                self.events.log(OrchestrationEvent::new(
                    ORCHESTRATION_COMPLETED,
                    json!({
                        "consensus_id": result.consensus.id,
                        "confidence": result.confidence.mean,
                        "total_time_ms": result.performance.total_time.as_millis() as u64,
                        "team_size": result.performance.team_size,
                    }),
                ));
            }
            Err(e) => {
                warn!("Orchestration failed: {}", e);
                self.controller.record_failure();
                self.events.log(OrchestrationEvent::new(
                    ORCHESTRATION_FAILED,
                    json!({ "kind": e.kind(), "error": e.to_string() }),
                ));
            }
        }

        self.adapt(&request);
        outcome
    }

    /// Rolling averages over past calls.
    pub fn get_performance_metrics(&self) -> PerformanceMetrics {
        self.controller.metrics()
    }

    /// Reset every pooled and active agent and clear history.
    ///
    /// Adapted defaults are kept.
    pub fn reset(&mut self) {
        self.pool.reset();
        self.controller.clear();
        info!("Orchestrator reset");
    }

    async fn run(
        &mut self,
        request: &OrchestrationRequest,
        cancel: &CancellationToken,
        started: Instant,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        let fail = |stage: Stage, cause: StageFailure| {
            OrchestrateError::from(OrchestrationError::new(stage, request, cause))
        };
        let progress = Arc::clone(&self.progress);
        let events = Arc::clone(&self.events);

        // Stage 1: Analysis
        progress.on_stage_start(&Stage::Analysis, 1);
        request
            .validate()
            .map_err(|e| fail(Stage::Analysis, e.into()))?;
        let complexity =
            ComplexityAnalyzer::new(self.config.min_agents, self.config.max_agents).analyze(request);
        info!(
            "Complexity {:.2}: team of {} covering {:?}",
            complexity.score, complexity.recommended_team_size, complexity.required_capabilities
        );
        progress.on_stage_complete(&Stage::Analysis);

        // Stage 2: Assembly
        progress.on_stage_start(&Stage::Assembly, complexity.recommended_team_size);
        let assembly = self
            .pool
            .assemble(&complexity, events.as_ref())
            .await
            .map_err(|e| fail(Stage::Assembly, e))?;
        progress.on_stage_complete(&Stage::Assembly);

        // Stage 3: Dispatch
        let team: Vec<&ActiveAgent> = assembly
            .members
            .iter()
            .filter_map(|id| self.pool.get(id))
            .collect();
        let assignments = WorkDistributor::plan(&request.context, &team);
        let team_size = assignments.len();
        let max_time = self.config.effective_max_time(request.constraints.max_time);
        let deadline = started
            .checked_add(max_time)
            .unwrap_or_else(|| started + FAR_FUTURE);
        let distributor = WorkDistributor::new(self.config.min_participants);

        progress.on_stage_start(&Stage::Dispatch, team_size);
        let gathered = distributor
            .dispatch(
                &request.query,
                assignments,
                deadline,
                cancel,
                progress.as_ref(),
                events.as_ref(),
            )
            .await
            .map_err(|_| fail(Stage::Dispatch, StageFailure::Cancelled))?;
        self.pool.record_results(gathered.participant_ids());
        progress.on_stage_complete(&Stage::Dispatch);

        distributor.ensure_quorum(&gathered)?;
        let participants = gathered.participants;

        // Stage 4: Consensus
        progress.on_stage_start(&Stage::Consensus, 1);
        let method = ConsensusMethod::select(
            participants.len(),
            request.min_confidence(),
            self.config.default_method,
        );
        let threshold = self.config.effective_threshold(request.min_confidence());
        info!(
            "Reconciling {} participants with {} (threshold {:.2})",
            participants.len(),
            method,
            threshold
        );
        let consensus = self
            .engine
            .run(method, &participants, threshold)
            .map_err(|e| match e {
                ConsensusError::Quality(quality) => OrchestrateError::ConsensusQuality(quality),
                other => fail(Stage::Consensus, StageFailure::Consensus(other)),
            })?;
        events.log(OrchestrationEvent::new(
            CONSENSUS_REACHED,
            json!({
                "consensus_id": consensus.id,
                "method": method.as_str(),
                "confidence": consensus.confidence.mean,
                "participants": consensus.participants.len(),
                "dissent": consensus.dissent.len(),
            }),
        ));
        progress.on_stage_complete(&Stage::Consensus);

        // Stage 5: Synthesis
        progress.on_stage_start(&Stage::Synthesis, 1);
        let synthesized = self.synthesizer.synthesize(&participants);

        let estimated_cost: f64 = participants
            .iter()
            .map(|p| {
                let cost_per_token = self
                    .pool
                    .get(&p.agent_id)
                    .map(|a| a.model().cost_per_token)
                    .unwrap_or(0.0);
                estimate_tokens(&p.message.text()) as f64 * cost_per_token
            })
            .sum();
        let over_budget = request
            .constraints
            .max_cost
            .is_some_and(|max| estimated_cost > max);
        if over_budget {
            warn!(
                "Estimated cost {:.4} exceeds max_cost {:?}",
                estimated_cost, request.constraints.max_cost
            );
        }

        let performance = PerformanceReport {
            total_time: started.elapsed(),
            team_size,
            participants: participants.len(),
            failed_agents: gathered.failures.len(),
            reused_agents: assembly.reused,
            spawned_agents: assembly.spawned + assembly.revived,
            method,
            complexity: complexity.score,
            estimated_cost,
            over_budget,
        };
        progress.on_stage_complete(&Stage::Synthesis);

        info!(
            "Consensus reached in {:?}: confidence {:.2}",
            performance.total_time, consensus.confidence.mean
        );

        Ok(OrchestrationResult {
            response: consensus.consensus.clone(),
            confidence: consensus.confidence.clone(),
            reasoning: synthesized.reasoning,
            evidence: synthesized.evidence,
            consensus,
            performance,
            predictions: synthesized.predictions,
        })
    }

    fn adapt(&mut self, request: &OrchestrationRequest) {
        let current = Policy {
            method: self.config.default_method,
            max_agents: self.config.max_agents,
        };
        let max_time = self.config.effective_max_time(request.constraints.max_time);
        let adjustment = self.controller.adapt(current, max_time);
        if !adjustment.changed() {
            return;
        }

        info!(
            "Policy adjusted: method {} -> {}, max_agents {} -> {}",
            adjustment.before.method,
            adjustment.after.method,
            adjustment.before.max_agents,
            adjustment.after.max_agents
        );
        self.config.default_method = adjustment.after.method;
        self.config.max_agents = adjustment.after.max_agents;
        self.events.log(OrchestrationEvent::new(
            POLICY_ADJUSTED,
            json!({ "before": adjustment.before, "after": adjustment.after }),
        ));
    }
}

/// An [`Orchestrator`] behind an async mutex, for concurrent callers
///
/// Calls are serialized: each waits for the previous one to finish.
#[derive(Clone)]
pub struct SharedOrchestrator {
    inner: Arc<Mutex<Orchestrator>>,
}

impl SharedOrchestrator {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(orchestrator)),
        }
    }

    pub async fn orchestrate(
        &self,
        request: OrchestrationRequest,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        self.inner.lock().await.orchestrate(request).await
    }

    pub async fn orchestrate_with_cancel(
        &self,
        request: OrchestrationRequest,
        cancel: CancellationToken,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        self.inner
            .lock()
            .await
            .orchestrate_with_cancel(request, cancel)
            .await
    }

    pub async fn get_performance_metrics(&self) -> PerformanceMetrics {
        self.inner.lock().await.get_performance_metrics()
    }

    pub async fn reset(&self) {
        self.inner.lock().await.reset();
    }
}
