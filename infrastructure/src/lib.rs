//! Infrastructure layer for agent-ensemble
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod agents;
pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use agents::{PromptedAgent, PromptedAgentFactory};
pub use config::{
    ConfigLoader, FileConfig, FileLoggingConfig, FileOrchestratorConfig, FileOutputConfig,
    FileProviderConfig,
};
pub use logging::JsonlEventLogger;
pub use providers::OpenAiCompatibleProvider;
