//! OpenAI-compatible chat completions adapter
//!
//! Talks to `{base_url}/v1/chat/completions`, which hosted OpenAI and most
//! local inference servers (llama.cpp, vLLM, Ollama) expose. 429 and 5xx
//! responses are retried with bounded exponential backoff.

use crate::config::FileProviderConfig;
use async_trait::async_trait;
use ensemble_application::{LlmProvider, ProviderError};
use ensemble_domain::{CompletionRequest, CompletionResponse, ModelSpec, RateLimit, TokenUsage};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const DEFAULT_RETRY_BASE: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Provider for any endpoint speaking the OpenAI chat completions protocol
pub struct OpenAiCompatibleProvider {
    id: String,
    name: String,
    endpoint: String,
    api_key: Option<String>,
    models: Vec<ModelSpec>,
    rate_limit: RateLimit,
    max_retries: u32,
    retry_base: Duration,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        id: impl Into<String>,
        base_url: &str,
        models: Vec<ModelSpec>,
    ) -> Result<Self, ProviderError> {
        Self::with_timeout(id, base_url, models, Duration::from_secs(120))
    }

    fn with_timeout(
        id: impl Into<String>,
        base_url: &str,
        models: Vec<ModelSpec>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;
        let id = id.into();

        Ok(Self {
            name: id.clone(),
            id,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), COMPLETIONS_PATH),
            api_key: None,
            models,
            rate_limit: RateLimit::default(),
            max_retries: 3,
            retry_base: DEFAULT_RETRY_BASE,
            max_tokens: None,
            temperature: None,
            client,
        })
    }

    /// Build a provider from its `[[providers]]` table.
    ///
    /// The API key is read from `api_key_env`. A missing variable is logged
    /// and the provider is built without a key, which local servers accept.
    pub fn from_config(config: &FileProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key_env.as_deref().and_then(|var| {
            match std::env::var(var) {
                Ok(key) if !key.is_empty() => Some(key),
                _ => {
                    warn!(
                        "Provider {}: environment variable {} is not set, sending no API key",
                        config.id, var
                    );
                    None
                }
            }
        });

        let mut provider = Self::with_timeout(
            config.id.clone(),
            &config.base_url,
            config.models.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_name(config.display_name())
        .with_rate_limit(config.rate_limit)
        .with_max_retries(config.max_retries);
        provider.api_key = api_key;
        provider.max_tokens = config.max_tokens;
        provider.temperature = config.temperature;
        Ok(provider)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn body<'a>(&self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &request.model,
            messages,
            max_tokens: request.max_tokens.or(self.max_tokens),
            temperature: request.temperature.or(self.temperature),
        }
    }

    /// Delay before retry number `attempt` (0-based), doubling up to a cap.
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_RETRY_DELAY)
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<CompletionResponse, Attempt> {
        let mut builder = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Attempt::Retry(ProviderError::Timeout)
            } else if e.is_connect() {
                Attempt::Retry(ProviderError::ConnectionError(e.to_string()))
            } else {
                Attempt::Fatal(ProviderError::RequestFailed(e.to_string()))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = format!(
                "HTTP {} {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                text.trim()
            );
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                Attempt::Retry(ProviderError::RateLimited(message))
            } else if status.is_server_error() {
                Attempt::Retry(ProviderError::RequestFailed(message))
            } else {
                Attempt::Fatal(ProviderError::RequestFailed(message))
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Attempt::Fatal(ProviderError::InvalidResponse(e.to_string())))?;
        parse_response(body.model, parsed).map_err(Attempt::Fatal)
    }
}

/// Outcome of one HTTP attempt that did not produce a response
enum Attempt {
    Retry(ProviderError),
    Fatal(ProviderError),
}

fn parse_response(requested_model: &str, parsed: ChatResponse) -> Result<CompletionResponse, ProviderError> {
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

    let mut response = CompletionResponse::new(
        parsed.model.unwrap_or_else(|| requested_model.to_string()),
        content,
    );
    if let Some(usage) = parsed.usage {
        response.usage = TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        };
    }
    Ok(response)
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn models(&self) -> &[ModelSpec] {
        &self.models
    }

    fn rate_limit(&self) -> RateLimit {
        self.rate_limit
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let body = self.body(&request);
        let mut attempt = 0;

        loop {
            match self.send_once(&body).await {
                Ok(response) => {
                    debug!(
                        provider = %self.id,
                        model = %response.model,
                        bytes = response.content.len(),
                        "Completion received"
                    );
                    return Ok(response);
                }
                Err(Attempt::Retry(e)) if attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "Provider {} attempt {} failed, retrying in {:?}: {}",
                        self.id,
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(Attempt::Retry(e)) | Err(Attempt::Fatal(e)) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const OK_BODY: &str = r#"{"model":"qwen-72b","choices":[{"message":{"role":"assistant","content":"42"}}],"usage":{"prompt_tokens":12,"completion_tokens":1}}"#;

    /// Serve the given (status, body) pairs in order, one per connection.
    /// Returns the base URL, a hit counter, and the raw requests received.
    async fn serve(
        responses: Vec<(u16, &'static str)>,
    ) -> (String, Arc<AtomicUsize>, Arc<tokio::sync::Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let hits_task = Arc::clone(&hits);
        let requests_task = Arc::clone(&requests);
        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let raw = read_request(&mut socket).await;
                requests_task.lock().await.push(raw);
                hits_task.fetch_add(1, Ordering::SeqCst);

                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), hits, requests)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn provider(base_url: &str) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new("local", base_url, vec![ModelSpec::new("qwen-72b", 32_000)])
            .unwrap()
            .with_retry_base(Duration::from_millis(1))
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let p = OpenAiCompatibleProvider::new("p", "http://localhost:8080/", vec![]).unwrap();
        assert_eq!(p.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_body_includes_system_and_user_messages() {
        let p = provider("http://localhost");
        let request = CompletionRequest::new("qwen-72b", "What is 6 x 7?").with_system("Be brief.");
        let json = serde_json::to_value(p.body(&request)).unwrap();

        assert_eq!(json["model"], "qwen-72b");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "Be brief.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_response_without_choices_is_invalid() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        let err = parse_response("m", parsed).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let p = OpenAiCompatibleProvider::new("p", "http://localhost", vec![]).unwrap();
        assert_eq!(p.backoff(0), Duration::from_millis(500));
        assert_eq!(p.backoff(1), Duration::from_millis(1000));
        assert_eq!(p.backoff(2), Duration::from_millis(2000));
        assert_eq!(p.backoff(10), MAX_RETRY_DELAY);
    }

    #[tokio::test]
    async fn test_complete_success_sends_bearer_key() {
        let (url, hits, requests) = serve(vec![(200, OK_BODY)]).await;
        let p = provider(&url).with_api_key("sk-test");

        let response = p
            .complete(CompletionRequest::new("qwen-72b", "What is 6 x 7?"))
            .await
            .unwrap();

        assert_eq!(response.content, "42");
        assert_eq!(response.model, "qwen-72b");
        assert_eq!(response.usage.prompt_tokens, 12);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let raw = requests.lock().await[0].to_lowercase();
        assert!(raw.starts_with("post /v1/chat/completions"));
        assert!(raw.contains("authorization: bearer sk-test"));
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let (url, hits, _) = serve(vec![(429, "{}"), (503, "{}"), (200, OK_BODY)]).await;
        let p = provider(&url);

        let response = p
            .complete(CompletionRequest::new("qwen-72b", "q"))
            .await
            .unwrap();

        assert_eq!(response.content, "42");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (url, hits, _) = serve(vec![(429, "{}"), (429, "{}"), (429, "{}")]).await;
        let p = provider(&url).with_max_retries(2);

        let err = p
            .complete(CompletionRequest::new("qwen-72b", "q"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, hits, _) = serve(vec![(401, r#"{"error":"bad key"}"#), (200, OK_BODY)]).await;
        let p = provider(&url);

        let err = p
            .complete(CompletionRequest::new("qwen-72b", "q"))
            .await
            .unwrap_err();

        match err {
            ProviderError::RequestFailed(msg) => assert!(msg.contains("401")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_uses_declared_settings() {
        let config = FileProviderConfig {
            id: "local".to_string(),
            name: Some("Local vLLM".to_string()),
            base_url: "http://127.0.0.1:8000".to_string(),
            api_key_env: None,
            models: vec![ModelSpec::new("qwen-72b", 32_000)],
            rate_limit: RateLimit {
                concurrent_requests: 2,
                ..RateLimit::default()
            },
            ..Default::default()
        };

        let p = OpenAiCompatibleProvider::from_config(&config).unwrap();
        assert_eq!(p.id(), "local");
        assert_eq!(p.name(), "Local vLLM");
        assert_eq!(p.models().len(), 1);
        assert_eq!(p.rate_limit().concurrent_requests, 2);
        assert!(p.api_key.is_none());
    }
}
