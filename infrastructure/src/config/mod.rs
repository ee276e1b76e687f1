//! Configuration file loading for agent-ensemble
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ENSEMBLE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./ensemble.toml` or `./.ensemble.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/agent-ensemble/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileLoggingConfig, FileOrchestratorConfig, FileOutputConfig, FileProviderConfig,
};
pub use loader::ConfigLoader;
