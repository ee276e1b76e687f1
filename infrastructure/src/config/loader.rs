//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "agent-ensemble";
const PROJECT_FILES: [&str; 2] = ["ensemble.toml", ".ensemble.toml"];
const ENV_PREFIX: &str = "ENSEMBLE_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `ENSEMBLE_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./ensemble.toml` or `./.ensemble.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/agent-ensemble/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(Box::new(figment::Error::from(format!(
                "config file not found: {}",
                path.display()
            ))));
        }

        Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path.map(PathBuf::as_path),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(Box::new)
    }

    /// File layers only, lowest priority first. Missing files are skipped.
    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project, explicit].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/agent-ensemble/config.toml if set,
    /// otherwise falls back to ~/.config/agent-ensemble/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for --show-config)
    pub fn config_sources(explicit: Option<&PathBuf>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [ENV  ] Environment: {}*", ENV_PREFIX));

        if let Some(path) = explicit {
            lines.push(format!("  [FOUND] Explicit: {}", path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push(format!(
                "  [     ] Project: ./{} or ./{}",
                PROJECT_FILES[0], PROJECT_FILES[1]
            )),
        }

        if let Some(path) = Self::global_config_path() {
            let marker = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", marker, path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.providers.is_empty());
        assert_eq!(config.orchestrator.max_agents, 7);
        assert!(config.output.color);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("agent-ensemble"));
    }

    #[test]
    fn test_layers_override_in_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = write_toml(
            dir.path(),
            "global.toml",
            "[orchestrator]\nmax_agents = 5\nmin_participants = 3\n",
        );
        let project = write_toml(dir.path(), "project.toml", "[orchestrator]\nmax_agents = 6\n");
        let explicit = write_toml(dir.path(), "explicit.toml", "[output]\ncolor = false\n");

        let config: FileConfig =
            ConfigLoader::figment(Some(global.as_path()), Some(project.as_path()), Some(explicit.as_path()))
                .extract()
                .unwrap();

        assert_eq!(config.orchestrator.max_agents, 6);
        assert_eq!(config.orchestrator.min_participants, 3);
        assert_eq!(config.orchestrator.min_agents, 3);
        assert!(!config.output.color);
    }

    #[test]
    fn test_missing_layers_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");

        let config: FileConfig = ConfigLoader::figment(Some(missing.as_path()), Some(missing.as_path()), None)
            .extract()
            .unwrap();

        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");

        let err = ConfigLoader::load(Some(&missing)).unwrap_err();

        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_providers_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = write_toml(
            dir.path(),
            "providers.toml",
            r#"
[[providers]]
id = "local"
base_url = "http://localhost:8080"
models = [{ id = "qwen", context_window = 32000 }]
"#,
        );

        let config: FileConfig = ConfigLoader::figment(None, None, Some(explicit.as_path()))
            .extract()
            .unwrap();

        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].base_url, "http://localhost:8080");
        assert_eq!(config.providers[0].max_retries, 3);
        assert!(config.validate().is_empty());
    }
}
