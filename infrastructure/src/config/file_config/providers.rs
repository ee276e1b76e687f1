//! Provider configuration from TOML (`[[providers]]` tables)

use ensemble_domain::{ConfigIssue, ConfigIssueCode, ModelSpec, RateLimit};
use serde::{Deserialize, Serialize};

/// One OpenAI-compatible endpoint and the models it serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Unique provider id used in logs and reports.
    pub id: String,
    /// Human-readable name (defaults to the id).
    pub name: Option<String>,
    /// Base URL, without the `/v1/chat/completions` suffix.
    pub base_url: String,
    /// Environment variable holding the API key. Local servers usually need none.
    pub api_key_env: Option<String>,
    /// Model catalog.
    pub models: Vec<ModelSpec>,
    /// Declared rate limits; `concurrent_requests` bounds in-flight calls.
    pub rate_limit: RateLimit,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries on 429 and 5xx before giving up.
    pub max_retries: u32,
    /// Max tokens per completion.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: None,
            base_url: "https://api.openai.com".to_string(),
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            models: Vec::new(),
            rate_limit: RateLimit::default(),
            timeout_secs: 120,
            max_retries: 3,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl FileProviderConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.models.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyModelList,
                format!("providers.{}: no models declared", self.id),
            ));
        }

        if self.rate_limit.concurrent_requests == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::NoConcurrency,
                format!(
                    "providers.{}: rate_limit.concurrent_requests is 0, using 1",
                    self.id
                ),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_deserialize() {
        let toml_str = r#"
[[providers]]
id = "local"
base_url = "http://localhost:11434"
api_key_env = "LOCAL_KEY"

[[providers.models]]
id = "llama-70b"
context_window = 32000
capabilities = ["chat", "reasoning"]
cost_per_token = 0.0

[providers.rate_limit]
requests_per_minute = 30
tokens_per_minute = 50000
concurrent_requests = 2
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let provider = &config.providers[0];
        assert_eq!(provider.id, "local");
        assert_eq!(provider.display_name(), "local");
        assert_eq!(provider.models[0].id, "llama-70b");
        assert_eq!(provider.models[0].capabilities.len(), 2);
        assert_eq!(provider.rate_limit.concurrent_requests, 2);
        assert_eq!(provider.max_retries, 3);
        assert!(provider.validate().is_empty());
    }

    #[test]
    fn test_provider_without_models_is_an_error() {
        let provider = FileProviderConfig {
            id: "empty".to_string(),
            ..Default::default()
        };
        let issues = provider.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::EmptyModelList);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_zero_concurrency_is_a_warning() {
        let provider = FileProviderConfig {
            id: "p".to_string(),
            models: vec![ModelSpec::new("m", 8000)],
            rate_limit: RateLimit {
                concurrent_requests: 0,
                ..RateLimit::default()
            },
            ..Default::default()
        };
        let issues = provider.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::NoConcurrency);
        assert!(!issues[0].is_error());
    }
}
