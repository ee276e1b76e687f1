//! Application-level configuration.
//!
//! - [`OrchestratorConfig`] - team bounds, quorum and quality gates, pool and history sizes

pub mod orchestrator_config;

pub use orchestrator_config::OrchestratorConfig;
