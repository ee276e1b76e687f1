//! Prompted reasoning agent
//!
//! An agent whose reasoning is delegated to its bound model: it renders the
//! system prompt from its template once, sends the query with its
//! specialized context, and parses the JSON reply into a [`Message`].

use async_trait::async_trait;
use ensemble_application::{AgentError, AgentFactory, ModelInterface, ReasoningAgent};
use ensemble_domain::{
    AgentTemplate, Capability, Context, Message, ReasoningPromptTemplate, parse_reply,
};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A reasoning agent that prompts its model for a structured reply
pub struct PromptedAgent {
    id: String,
    capabilities: Vec<Capability>,
    default_concept: &'static str,
    system_prompt: String,
    max_tokens: Option<u32>,
    last_reply: Mutex<Option<String>>,
}

impl PromptedAgent {
    pub fn new(id: impl Into<String>, template: &AgentTemplate) -> Self {
        Self {
            id: id.into(),
            capabilities: template.capabilities.iter().map(|c| c.capability).collect(),
            default_concept: template
                .primary()
                .unwrap_or(Capability::Reasoning)
                .as_str(),
            system_prompt: ReasoningPromptTemplate::system(template),
            max_tokens: None,
            last_reply: Mutex::new(None),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Raw text of the most recent model reply, cleared on reset.
    pub fn last_reply(&self) -> Option<String> {
        self.last_reply.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl ReasoningAgent for PromptedAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn process_query(
        &self,
        query: &str,
        context: &Context,
        model: &ModelInterface,
    ) -> Result<Message, AgentError> {
        let mut request = model
            .request(ReasoningPromptTemplate::query(query, context))
            .with_system(self.system_prompt.clone());
        request.max_tokens = self.max_tokens;

        let response = model.complete(request).await?;
        let raw = response.content.trim();
        if raw.is_empty() {
            return Err(AgentError::Processing(format!(
                "{} received an empty reply from {}",
                self.id,
                model.model().id
            )));
        }

        debug!(
            agent = %self.id,
            model = %response.model,
            bytes = raw.len(),
            "Agent reply received"
        );

        let concept = context
            .get("focus")
            .and_then(|v| v.as_str())
            .unwrap_or(self.default_concept);
        let message = parse_reply(&self.id, raw, concept);

        if let Ok(mut last) = self.last_reply.lock() {
            *last = Some(raw.to_string());
        }
        Ok(message)
    }

    fn reset(&self) {
        if let Ok(mut last) = self.last_reply.lock() {
            *last = None;
        }
    }
}

/// Builds [`PromptedAgent`]s from templates
#[derive(Debug, Clone, Default)]
pub struct PromptedAgentFactory {
    max_tokens: Option<u32>,
}

impl PromptedAgentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl AgentFactory for PromptedAgentFactory {
    async fn create(
        &self,
        id: &str,
        template: &AgentTemplate,
    ) -> Result<Arc<dyn ReasoningAgent>, AgentError> {
        if template.capabilities.is_empty() {
            return Err(AgentError::Creation(format!(
                "template {} declares no capabilities",
                template.id
            )));
        }

        let mut agent = PromptedAgent::new(id, template);
        if let Some(max_tokens) = self.max_tokens {
            agent = agent.with_max_tokens(max_tokens);
        }
        Ok(Arc::new(agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_application::{LlmProvider, ProviderError, ProviderHandle};
    use ensemble_domain::{
        CompletionRequest, CompletionResponse, ModelSpec, RateLimit, StepType,
    };

    /// Replies with a fixed text and records the requests it saw
    struct CannedProvider {
        reply: String,
        models: Vec<ModelSpec>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl CannedProvider {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                models: vec![ModelSpec::new("canned-1", 8_000)],
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn id(&self) -> &str {
            "canned"
        }
        fn name(&self) -> &str {
            "Canned"
        }
        fn models(&self) -> &[ModelSpec] {
            &self.models
        }
        fn rate_limit(&self) -> RateLimit {
            RateLimit::default()
        }
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(CompletionResponse::new(request.model, self.reply.clone()))
        }
    }

    fn analyst() -> AgentTemplate {
        AgentTemplate::new("analyst", "Logical Analyst")
            .with_capability(Capability::LogicalAnalysis, 0.9)
            .with_capability(Capability::Reasoning, 0.7)
    }

    fn interface(provider: Arc<CannedProvider>) -> ModelInterface {
        let handle = ProviderHandle::new(provider);
        let model = handle.best_model().cloned().unwrap();
        ModelInterface::new(handle, model)
    }

    #[tokio::test]
    async fn test_json_reply_becomes_message() {
        let provider = CannedProvider::new(
            r#"{"steps": [{"type": "conclusion", "concept": "answer", "content": "Yes", "confidence": 0.8}], "uncertainty": 0.2}"#,
        );
        let model = interface(Arc::clone(&provider));
        let agent = PromptedAgent::new("analyst-1", &analyst()).with_max_tokens(512);

        let mut context = Context::new();
        context.insert("focus".into(), "logical_analysis".into());
        let msg = agent.process_query("Is it?", &context, &model).await.unwrap();

        assert_eq!(msg.agent_id, "analyst-1");
        assert_eq!(msg.reasoning.steps[0].content, "Yes");
        assert_eq!(msg.uncertainty.total, 0.2);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].model, "canned-1");
        assert_eq!(seen[0].max_tokens, Some(512));
        assert!(seen[0].system.as_deref().unwrap().contains("Logical Analyst"));
        assert!(seen[0].prompt.contains("Is it?"));
    }

    #[tokio::test]
    async fn test_plain_reply_falls_back_to_focus_concept() {
        let model = interface(CannedProvider::new("Probably yes."));
        let agent = PromptedAgent::new("analyst-1", &analyst());

        let mut context = Context::new();
        context.insert("focus".into(), "reasoning".into());
        let msg = agent.process_query("Is it?", &context, &model).await.unwrap();

        let step = &msg.reasoning.steps[0];
        assert_eq!(step.step_type, StepType::Conclusion);
        assert_eq!(step.concept, "reasoning");
        assert_eq!(step.content, "Probably yes.");
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let model = interface(CannedProvider::new("   "));
        let agent = PromptedAgent::new("analyst-1", &analyst());

        let err = agent
            .process_query("Is it?", &Context::new(), &model)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Processing(_)));
    }

    #[tokio::test]
    async fn test_reset_clears_last_reply() {
        let model = interface(CannedProvider::new("Probably yes."));
        let agent = PromptedAgent::new("analyst-1", &analyst());

        agent
            .process_query("Is it?", &Context::new(), &model)
            .await
            .unwrap();
        assert_eq!(agent.last_reply().as_deref(), Some("Probably yes."));

        agent.reset();
        assert!(agent.last_reply().is_none());
    }

    #[tokio::test]
    async fn test_factory_builds_agents_and_rejects_empty_templates() {
        let factory = PromptedAgentFactory::new();

        let agent = factory.create("analyst-7", &analyst()).await.unwrap();
        assert_eq!(agent.id(), "analyst-7");
        assert_eq!(
            agent.capabilities(),
            &[Capability::LogicalAnalysis, Capability::Reasoning]
        );

        let empty = AgentTemplate::new("blank", "Blank");
        assert!(matches!(
            factory.create("blank-1", &empty).await,
            Err(AgentError::Creation(_))
        ));
    }
}
