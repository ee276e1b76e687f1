//! Console output formatter for orchestration results

use colored::Colorize;
use ensemble_domain::{
    ConfigIssue, OrchestrationResult, OutputFormat, PerformanceMetrics, Severity,
};

/// Formats orchestration results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a result in the requested style
    pub fn render(result: &OrchestrationResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Summary => Self::format_summary(result),
            OutputFormat::Full => Self::format(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    /// Format the complete result
    pub fn format(result: &OrchestrationResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Ensemble Results"));
        output.push('\n');

        output.push_str(&format!(
            "\n{} {}\n",
            "Answer:".cyan().bold(),
            result.response
        ));
        output.push_str(&Self::confidence_line(result));

        // Reasoning
        if !result.reasoning.steps.is_empty() {
            output.push_str(&Self::section_header("Reasoning"));
            for step in &result.reasoning.steps {
                output.push_str(&format!(
                    "  {} {} {}\n",
                    format!("[{}]", step.step_type).yellow(),
                    step.content,
                    format!("({:.2})", step.confidence.mean).dimmed()
                ));
            }
            if let Some(pattern) = &result.reasoning.temporal_pattern {
                output.push_str(&format!("  {} {}\n", "Pattern:".dimmed(), pattern));
            }
        }

        // Evidence
        if !result.evidence.is_empty() {
            output.push_str(&Self::section_header("Evidence"));
            for evidence in &result.evidence {
                let source = evidence
                    .source
                    .as_deref()
                    .map(|s| format!(" [{}]", s))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "  * {}{} {}\n",
                    evidence.content,
                    source.dimmed(),
                    format!("({:.2})", evidence.rank_score()).dimmed()
                ));
            }
        }

        // Predictions
        if !result.predictions.is_empty() {
            output.push_str(&Self::section_header("Predictions"));
            for prediction in &result.predictions {
                let horizon = prediction
                    .horizon
                    .as_deref()
                    .map(|h| format!(", {}", h))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "  * {}: {} ({:.2}{})\n",
                    prediction.prediction_type.bold(),
                    prediction.content,
                    prediction.confidence.mean,
                    horizon
                ));
            }
        }

        // Participants
        output.push_str(&Self::section_header("Participants"));
        for participant in &result.consensus.participants {
            output.push_str(&format!(
                "  {} {} {}\n",
                format!("── {} ──", participant.agent_id).yellow().bold(),
                participant.position,
                format!(
                    "(confidence {:.2}, weight {:.2})",
                    participant.confidence, participant.contribution
                )
                .dimmed()
            ));
        }

        output.push_str(&Self::dissent_block(result));

        // Performance
        let perf = &result.performance;
        output.push_str(&Self::section_header("Performance"));
        output.push_str(&format!(
            "  Method: {}   Complexity: {:.2}   Time: {:.1}s\n",
            perf.method,
            perf.complexity,
            perf.total_time.as_secs_f64()
        ));
        output.push_str(&format!(
            "  Team: {} ({} reused, {} spawned)   Participants: {}   Failed: {}\n",
            perf.team_size,
            perf.reused_agents,
            perf.spawned_agents,
            perf.participants,
            perf.failed_agents
        ));
        let cost = format!("  Estimated cost: {:.4}", perf.estimated_cost);
        if perf.over_budget {
            output.push_str(&format!("{} {}\n", cost, "(over budget)".red()));
        } else {
            output.push_str(&format!("{}\n", cost));
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &OrchestrationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the answer only (concise output)
    pub fn format_summary(result: &OrchestrationResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Ensemble Answer ===".cyan().bold()
        ));
        output.push_str(&result.response);
        output.push('\n');
        output.push('\n');
        output.push_str(&Self::confidence_line(result));
        output.push_str(&Self::dissent_block(result));

        output
    }

    /// Format rolling performance metrics
    pub fn format_metrics(metrics: &PerformanceMetrics) -> String {
        format!(
            "{} {} calls, {:.0}% success, avg {:.1}s, avg confidence {:.2}, avg team {:.1}\n",
            "Session:".dimmed(),
            metrics.total_calls,
            metrics.success_rate * 100.0,
            metrics.average_time.as_secs_f64(),
            metrics.average_confidence,
            metrics.average_team_size
        )
    }

    /// Format configuration issues, errors first
    pub fn format_issues(issues: &[ConfigIssue]) -> String {
        let mut sorted: Vec<&ConfigIssue> = issues.iter().collect();
        sorted.sort_by_key(|i| !i.is_error());

        sorted
            .into_iter()
            .map(|issue| match issue.severity {
                Severity::Error => format!("{} {}\n", "error:".red().bold(), issue.message),
                Severity::Warning => {
                    format!("{} {}\n", "warning:".yellow().bold(), issue.message)
                }
            })
            .collect()
    }

    fn confidence_line(result: &OrchestrationResult) -> String {
        let c = &result.confidence;
        format!(
            "{} {:.2} [{:.2}, {:.2}] via {} ({} of {} agree)\n",
            "Confidence:".dimmed(),
            c.mean,
            c.lower,
            c.upper,
            result.consensus.method,
            result
                .consensus
                .participants
                .len()
                .saturating_sub(result.consensus.dissent.len()),
            result.consensus.participants.len()
        )
    }

    fn dissent_block(result: &OrchestrationResult) -> String {
        if result.consensus.is_unanimous() {
            return String::new();
        }

        let mut output = format!("\n{}\n", "Dissent:".yellow().bold());
        for dissent in &result.consensus.dissent {
            output.push_str(&format!(
                "  * {}: {}\n",
                dissent.agent_id.bold(),
                dissent.position
            ));
            if !dissent.reasoning.is_empty() {
                output.push_str(&format!("{}\n", Self::indent(&dissent.reasoning, "      ")));
            }
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_domain::{
        Capability, ConfidenceInterval, ConfigIssueCode, ConsensusMethod, ConsensusResult,
        Dissent, Evidence, ParticipantSummary, PerformanceReport, Prediction, ReasoningChain,
        ReasoningStep, StepType,
    };
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn participant(id: &str, position: &str) -> ParticipantSummary {
        ParticipantSummary {
            agent_id: id.to_string(),
            capabilities: vec![Capability::Reasoning],
            contribution: 0.5,
            position: position.to_string(),
            confidence: 0.7,
        }
    }

    fn sample(dissent: Vec<Dissent>) -> OrchestrationResult {
        let participants = vec![
            participant("analyst-1", "Rates will fall"),
            participant("historian-2", "Rates will fall"),
            participant("critic-3", "Rates will hold"),
        ];
        OrchestrationResult {
            response: "Rates will fall".to_string(),
            confidence: ConfidenceInterval::new(0.72, 0.6, 0.8, "weighted"),
            reasoning: ReasoningChain::new(vec![ReasoningStep::new(
                "s1",
                StepType::Conclusion,
                "rates",
                "Inflation is cooling",
            )]),
            evidence: vec![Evidence::new("CPI down three months").with_source("BLS")],
            consensus: ConsensusResult {
                id: "c-1".to_string(),
                consensus: "Rates will fall".to_string(),
                confidence: ConfidenceInterval::point(0.72),
                participants,
                dissent,
                method: ConsensusMethod::WeightedVoting,
                timestamp: 0,
                aggregate_beliefs: BTreeMap::new(),
            },
            performance: PerformanceReport {
                total_time: Duration::from_millis(1500),
                team_size: 3,
                participants: 3,
                failed_agents: 0,
                reused_agents: 1,
                spawned_agents: 2,
                method: ConsensusMethod::WeightedVoting,
                complexity: 0.4,
                estimated_cost: 0.0123,
                over_budget: true,
            },
            predictions: vec![Prediction::new("rates", "cut in Q3", 0.6)],
        }
    }

    fn critic_dissent() -> Vec<Dissent> {
        vec![Dissent {
            agent_id: "critic-3".to_string(),
            position: "Rates will hold".to_string(),
            reasoning: "Wages are still rising".to_string(),
        }]
    }

    #[test]
    fn test_summary_shows_answer_and_dissent() {
        let out = ConsoleFormatter::render(&sample(critic_dissent()), OutputFormat::Summary);
        assert!(out.contains("Rates will fall"));
        assert!(out.contains("2 of 3 agree"));
        assert!(out.contains("critic-3"));
        assert!(out.contains("Wages are still rising"));
        assert!(!out.contains("Participants"));
    }

    #[test]
    fn test_summary_omits_dissent_when_unanimous() {
        let out = ConsoleFormatter::format_summary(&sample(vec![]));
        assert!(!out.contains("Dissent"));
    }

    #[test]
    fn test_full_shows_every_section() {
        let out = ConsoleFormatter::render(&sample(critic_dissent()), OutputFormat::Full);
        for needle in [
            "Reasoning",
            "Inflation is cooling",
            "CPI down three months",
            "cut in Q3",
            "analyst-1",
            "weighted_voting",
            "over budget",
        ] {
            assert!(out.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn test_json_output() {
        let json = ConsoleFormatter::render(&sample(critic_dissent()), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["response"], "Rates will fall");
        assert_eq!(value["consensus"]["method"], "weighted_voting");
        assert_eq!(value["performance"]["total_time"], 1500);
        assert_eq!(value["consensus"]["dissent"][0]["agent_id"], "critic-3");
    }

    #[test]
    fn test_issues_list_errors_first() {
        let issues = vec![
            ConfigIssue::warning(ConfigIssueCode::QuorumUnreachable, "quorum warn"),
            ConfigIssue::error(ConfigIssueCode::NoProviders, "no providers"),
        ];
        let out = ConsoleFormatter::format_issues(&issues);
        let error_at = out.find("no providers").unwrap();
        let warn_at = out.find("quorum warn").unwrap();
        assert!(error_at < warn_at);
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
