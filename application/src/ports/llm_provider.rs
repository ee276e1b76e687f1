//! LLM provider port
//!
//! Defines the interface for model providers and the handles the
//! orchestrator hands to agents for calling them.

use async_trait::async_trait;
use ensemble_domain::{CompletionRequest, CompletionResponse, ModelSpec, RateLimit};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Provider unavailable")]
    Unavailable,
}

/// A model provider
///
/// Implementations (adapters) live in the infrastructure layer. The
/// orchestrator only reads the model catalog and calls [`complete`].
///
/// [`complete`]: LlmProvider::complete
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn models(&self) -> &[ModelSpec];

    fn rate_limit(&self) -> RateLimit;

    /// Run one completion. Retries, if any, happen inside the adapter.
    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, ProviderError>;
}

/// A provider plus a concurrency limit sized by its rate limit
#[derive(Clone)]
pub struct ProviderHandle {
    provider: Arc<dyn LlmProvider>,
    permits: Arc<Semaphore>,
}

impl ProviderHandle {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        let concurrent = provider.rate_limit().concurrent_requests.max(1) as usize;
        Self {
            provider,
            permits: Arc::new(Semaphore::new(concurrent)),
        }
    }

    pub fn id(&self) -> &str {
        self.provider.id()
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// The provider's most capable declared model.
    ///
    /// Ranks by capability count, then context window; ties keep catalog order.
    pub fn best_model(&self) -> Option<&ModelSpec> {
        self.provider
            .models()
            .iter()
            .fold(None::<&ModelSpec>, |best, m| match best {
                Some(b) if b.capability_rank() >= m.capability_rank() => Some(b),
                _ => Some(m),
            })
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ProviderError::Unavailable)?;
        self.provider.complete(request).await
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("id", &self.id())
            .field("available_permits", &self.available_permits())
            .finish()
    }
}

/// The model-calling interface bound to one agent
///
/// Pairs a provider handle with the model the agent was bound to at spawn.
#[derive(Debug, Clone)]
pub struct ModelInterface {
    handle: ProviderHandle,
    model: ModelSpec,
}

impl ModelInterface {
    pub fn new(handle: ProviderHandle, model: ModelSpec) -> Self {
        Self { handle, model }
    }

    pub fn model(&self) -> &ModelSpec {
        &self.model
    }

    pub fn provider_id(&self) -> &str {
        self.handle.id()
    }

    /// A request pre-filled with the bound model id.
    pub fn request(&self, prompt: impl Into<String>) -> CompletionRequest {
        CompletionRequest::new(self.model.id.clone(), prompt)
    }

    pub async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.handle.complete(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowProvider {
        models: Vec<ModelSpec>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for SlowProvider {
        fn id(&self) -> &str {
            "slow"
        }
        fn name(&self) -> &str {
            "Slow"
        }
        fn models(&self) -> &[ModelSpec] {
            &self.models
        }
        fn rate_limit(&self) -> RateLimit {
            RateLimit {
                concurrent_requests: 2,
                ..Default::default()
            }
        }
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(CompletionResponse::new(request.model, "ok"))
        }
    }

    fn provider() -> Arc<SlowProvider> {
        Arc::new(SlowProvider {
            models: vec![
                ModelSpec::new("small", 8_000),
                ModelSpec::new("large", 128_000).with_capabilities(["reasoning", "code"]),
                ModelSpec::new("medium", 32_000).with_capabilities(["reasoning", "code"]),
            ],
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_best_model_prefers_capabilities_then_context() {
        let handle = ProviderHandle::new(provider());
        assert_eq!(handle.best_model().map(|m| m.id.as_str()), Some("large"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_limits_concurrency() {
        let inner = provider();
        let handle = ProviderHandle::new(inner.clone());
        assert_eq!(handle.available_permits(), 2);

        let calls = (0..5).map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.complete(CompletionRequest::new("small", "hi")).await })
        });
        for result in futures::future::join_all(calls).await {
            assert!(result.unwrap().is_ok());
        }
        assert_eq!(inner.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_model_interface_fills_model_id() {
        let handle = ProviderHandle::new(provider());
        let model = handle.best_model().cloned().unwrap();
        let interface = ModelInterface::new(handle, model);
        let response = interface.complete(interface.request("hello")).await.unwrap();
        assert_eq!(response.model, "large");
        assert_eq!(interface.provider_id(), "slow");
    }
}
