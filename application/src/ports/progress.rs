//! Progress notification port
//!
//! Defines the interface for reporting progress during an orchestration call.

use ensemble_domain::Stage;

/// Callback for progress updates during orchestration
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage starts; `total_tasks` is the team size for dispatch, else 1
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize);

    /// Called when an agent settles during dispatch
    fn on_agent_complete(&self, stage: &Stage, agent_id: &str, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: &Stage);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: &Stage, _total_tasks: usize) {}
    fn on_agent_complete(&self, _stage: &Stage, _agent_id: &str, _success: bool) {}
    fn on_stage_complete(&self, _stage: &Stage) {}
}
