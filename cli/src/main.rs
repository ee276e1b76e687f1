//! CLI entrypoint for Agent Ensemble
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use ensemble_application::{
    EventLogger, LlmProvider, NoEventLogger, NoProgress, Orchestrator, ProgressNotifier,
};
use ensemble_domain::{OrchestrationRequest, TemplateRegistry, has_errors};
use ensemble_infrastructure::{
    ConfigLoader, JsonlEventLogger, OpenAiCompatibleProvider, PromptedAgentFactory,
};
use ensemble_presentation::{Cli, ConsoleFormatter, ProgressReporter};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        for line in ConfigLoader::config_sources(cli.config.as_ref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let Some(query) = cli.query.clone() else {
        bail!("A query is required. Run with --help for usage.");
    };

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };

    let issues = file_config.validate();
    if !issues.is_empty() {
        eprint!("{}", ConsoleFormatter::format_issues(&issues));
    }
    if has_errors(&issues) {
        bail!("Configuration has errors, refusing to start");
    }

    if cli.no_color || !file_config.output.color {
        colored::control::set_override(false);
    }

    let (mut config, _) = file_config.orchestrator.to_orchestrator_config();
    if let Some(method) = cli.method {
        config = config.with_default_method(method);
    }

    // === Dependency Injection ===
    let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::with_capacity(file_config.providers.len());
    for provider_config in &file_config.providers {
        let provider = OpenAiCompatibleProvider::from_config(provider_config)
            .with_context(|| format!("Failed to create provider {}", provider_config.id))?;
        providers.push(Arc::new(provider));
    }

    let progress: Arc<dyn ProgressNotifier> = if cli.quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };

    let event_log = cli.event_log.clone().or(file_config.logging.event_log.clone());
    let events: Arc<dyn EventLogger> = match event_log {
        Some(path) => match JsonlEventLogger::new(&path) {
            Some(logger) => {
                info!("Writing orchestration events to {}", path.display());
                Arc::new(logger)
            }
            None => Arc::new(NoEventLogger),
        },
        None => Arc::new(NoEventLogger),
    };

    let mut orchestrator = Orchestrator::new(
        config,
        TemplateRegistry::builtin(),
        providers,
        Arc::new(PromptedAgentFactory::new()),
    )
    .with_progress(progress)
    .with_event_logger(events);

    // === Request ===
    let mut request = OrchestrationRequest::new(query);
    for (key, value) in &cli.context {
        request = request.with_context(key.clone(), value.clone());
    }
    for kind in &cli.evidence {
        request = request.with_required_evidence(kind.clone());
    }
    if let Some(secs) = cli.max_time {
        request = request.with_max_time(Duration::from_secs(secs));
    }
    if let Some(cost) = cli.max_cost {
        request = request.with_max_cost(cost);
    }
    if let Some(p) = cli.min_confidence {
        request = request.with_min_confidence(p);
    }

    // Ctrl-C aborts outstanding agents instead of killing the process mid-write
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding agents");
            on_interrupt.cancel();
        }
    });

    let format = cli
        .output
        .map(Into::into)
        .or(file_config.output.format)
        .unwrap_or_default();

    let result = orchestrator
        .orchestrate_with_cancel(request, cancel)
        .await
        .map_err(|e| anyhow::anyhow!("{} ({})", e, e.kind()))?;

    println!("{}", ConsoleFormatter::render(&result, format));
    if cli.verbose > 0 {
        eprint!(
            "{}",
            ConsoleFormatter::format_metrics(&orchestrator.get_performance_metrics())
        );
    }

    Ok(())
}
