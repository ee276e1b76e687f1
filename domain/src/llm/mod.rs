//! Model provider value objects
//!
//! Provider-neutral descriptions of model catalogs, rate limits and the
//! completion exchange. Adapters in the infrastructure layer translate these
//! to and from their wire formats.

use serde::{Deserialize, Serialize};

/// A model declared in a provider's catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: String,
    pub context_window: u32,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Cost per token, in the provider's currency unit
    #[serde(default)]
    pub cost_per_token: f64,
    /// Typical latency in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}

impl ModelSpec {
    pub fn new(id: impl Into<String>, context_window: u32) -> Self {
        Self {
            id: id.into(),
            context_window,
            capabilities: Vec::new(),
            cost_per_token: 0.0,
            latency_ms: 0,
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cost_per_token(mut self, cost: f64) -> Self {
        self.cost_per_token = cost;
        self
    }

    /// Ordering key for "most capable": declared capabilities, then context window.
    pub fn capability_rank(&self) -> (usize, u32) {
        (self.capabilities.len(), self.context_window)
    }
}

/// Provider-declared rate limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub requests_per_minute: u32,
    pub tokens_per_minute: u32,
    pub concurrent_requests: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            tokens_per_minute: 100_000,
            concurrent_requests: 4,
        }
    }
}

/// One request to a provider's completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Token usage reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A provider's answer to a [`CompletionRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub model: String,
    pub content: String,
    #[serde(default)]
    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            usage: TokenUsage::default(),
        }
    }
}

/// Rough token estimate for cost reporting: one token per four bytes.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}
