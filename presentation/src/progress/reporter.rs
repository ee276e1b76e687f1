//! Progress reporting for orchestration calls

use colored::Colorize;
use ensemble_application::ProgressNotifier;
use ensemble_domain::Stage;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during orchestration with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_label(stage: &Stage) -> String {
        format!("{}/5 {}", Self::stage_number(stage), stage.display_name())
    }

    fn stage_number(stage: &Stage) -> usize {
        match stage {
            Stage::Analysis => 1,
            Stage::Assembly => 2,
            Stage::Dispatch => 3,
            Stage::Consensus => 4,
            Stage::Synthesis => 5,
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(Self::stage_label(stage));
        pb.set_message("Starting...");

        if let Ok(mut bar) = self.stage_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_agent_complete(&self, _stage: &Stage, agent_id: &str, success: bool) {
        if let Ok(bar) = self.stage_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), agent_id)
            } else {
                format!("{} {}", "x".red(), agent_id)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: &Stage) {
        if let Ok(mut bar) = self.stage_bar.lock()
            && let Some(pb) = bar.take()
        {
            // Stages without per-agent ticks still end as a full bar
            if let Some(len) = pb.length() {
                pb.set_position(len);
            }
            pb.finish_with_message(format!("{} complete", stage.display_name().green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            ProgressReporter::stage_label(stage).bold(),
            total_tasks
        );
    }

    fn on_agent_complete(&self, _stage: &Stage, agent_id: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), agent_id);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), agent_id);
        }
    }

    fn on_stage_complete(&self, _stage: &Stage) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels_are_numbered() {
        assert_eq!(
            ProgressReporter::stage_label(&Stage::Analysis),
            "1/5 Complexity Analysis"
        );
        assert_eq!(ProgressReporter::stage_label(&Stage::Synthesis), "5/5 Synthesis");
    }

    #[test]
    fn test_reporter_tracks_one_bar_per_stage() {
        let reporter = ProgressReporter::new();
        reporter.on_stage_start(&Stage::Dispatch, 3);
        reporter.on_agent_complete(&Stage::Dispatch, "analyst-1", true);
        reporter.on_agent_complete(&Stage::Dispatch, "critic-2", false);
        {
            let bar = reporter.stage_bar.lock().unwrap();
            assert_eq!(bar.as_ref().unwrap().position(), 2);
        }
        reporter.on_stage_complete(&Stage::Dispatch);
        assert!(reporter.stage_bar.lock().unwrap().is_none());
    }
}
