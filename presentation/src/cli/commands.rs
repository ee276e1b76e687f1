//! CLI command definitions

use clap::{Parser, ValueEnum};
use ensemble_domain::ConsensusMethod;
use std::path::PathBuf;

/// Output format for orchestration results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Answer, confidence and dissent only
    Summary,
    /// Reasoning, evidence, predictions, participants and performance
    Full,
    /// JSON output
    Json,
}

impl From<OutputFormat> for ensemble_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Summary => ensemble_domain::OutputFormat::Summary,
            OutputFormat::Full => ensemble_domain::OutputFormat::Full,
            OutputFormat::Json => ensemble_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for agent-ensemble
#[derive(Parser, Debug)]
#[command(name = "agent-ensemble")]
#[command(author, version, about = "Multi-agent reasoning ensemble with adaptive consensus")]
#[command(long_about = r#"
Agent Ensemble answers a question with a team of specialized reasoning agents.

Each call runs five stages:
1. Complexity Analysis: score the request and pick team size and capabilities
2. Team Assembly: reuse, revive or spawn agents and bind them to models
3. Agent Dispatch: every agent answers in parallel, bounded by --max-time
4. Consensus: majority, weighted, Bayesian or game-theoretic reconciliation
5. Synthesis: merge reasoning, evidence and predictions into one answer

Configuration files are loaded from (in priority order):
1. ENSEMBLE_* environment variables
2. --config <path>     Explicit config file
3. ./ensemble.toml     Project-level config
4. ~/.config/agent-ensemble/config.toml   Global config

Example:
  agent-ensemble "Why did the 2008 financial crisis happen?"
  agent-ensemble --method bayesian --min-confidence 0.8 "Will rates fall next year?"
  agent-ensemble -c region=EU -c horizon=2y --output full "Forecast energy prices"
"#)]
pub struct Cli {
    /// The question to answer
    pub query: Option<String>,

    /// Default consensus method (simple_majority, weighted_voting, bayesian_aggregation, game_theoretic)
    #[arg(long, value_name = "METHOD", value_parser = parse_method)]
    pub method: Option<ConsensusMethod>,

    /// Minimum acceptable consensus confidence (0.0 to 1.0)
    #[arg(long, value_name = "P", value_parser = parse_probability)]
    pub min_confidence: Option<f64>,

    /// Upper bound in seconds on waiting for agents
    #[arg(long, value_name = "SECS")]
    pub max_time: Option<u64>,

    /// Budget for the estimated provider cost
    #[arg(long, value_name = "COST")]
    pub max_cost: Option<f64>,

    /// Kinds of evidence the answer must be backed by (repeatable)
    #[arg(long, value_name = "KIND")]
    pub evidence: Vec<String>,

    /// Extra context as key=value (repeatable)
    #[arg(short, long = "context", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub context: Vec<(String, String)>,

    /// Output format (defaults to [output].format, then summary)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Append orchestration events to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

fn parse_method(s: &str) -> Result<ConsensusMethod, String> {
    s.parse().map_err(|e: ensemble_domain::DomainError| e.to_string())
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{} is outside 0.0..=1.0", p))
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
