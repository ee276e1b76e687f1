//! Prompt templates for reasoning agents

use crate::agent::AgentTemplate;
use crate::core::request::Context;

/// Templates for the prompts a reasoning agent sends to its model
pub struct ReasoningPromptTemplate;

impl ReasoningPromptTemplate {
    /// System prompt describing the agent's role and the expected reply shape
    pub fn system(template: &AgentTemplate) -> String {
        let strengths = template
            .capabilities
            .iter()
            .map(|c| format!("{} ({:.2})", c.capability, c.strength))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"You are the {name}, one expert in a team answering the same question independently.
Your strengths: {strengths}.
Think step by step and answer from your own perspective. Other experts will cover theirs.

Reply with a single JSON object and nothing else:
{{
  "steps": [
    {{"id": "s1", "type": "premise|observation|assumption|inference|hypothesis|analysis|critique|synthesis|conclusion",
     "concept": "short label", "content": "the step", "confidence": 0.0-1.0,
     "supports": ["step ids"], "refutes": ["step ids"]}}
  ],
  "evidence": [{{"content": "...", "source": "...", "confidence": 0.0-1.0, "reliability": 0.0-1.0, "relevance": 0.0-1.0}}],
  "predictions": [{{"type": "category", "content": "...", "confidence": 0.0-1.0, "horizon": "..."}}],
  "uncertainty": 0.0-1.0,
  "beliefs": {{"proposition": 0.0-1.0}},
  "temporal_pattern": "optional label"
}}
End with exactly one step of type "conclusion" stating your answer in one sentence."#,
            name = template.name,
            strengths = strengths,
        )
    }

    /// User prompt carrying the query and the agent's specialized context
    pub fn query(query: &str, context: &Context) -> String {
        let mut prompt = format!("Question:\n{}\n", query);

        if let Some(focus) = context.get("focus").and_then(|v| v.as_str()) {
            prompt.push_str(&format!("\nFocus on: {}\n", focus));
        }
        if let (Some(index), Some(size)) = (
            context.get("perspective_index").and_then(|v| v.as_u64()),
            context.get("team_size").and_then(|v| v.as_u64()),
        ) {
            prompt.push_str(&format!("You are perspective {} of {}.\n", index + 1, size));
        }

        let extra: Vec<_> = context
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "focus" | "perspective_index" | "team_size" | "capabilities"))
            .collect();
        if !extra.is_empty() {
            prompt.push_str("\nContext:\n");
            for (key, value) in extra {
                match value.as_str() {
                    Some(s) => prompt.push_str(&format!("- {}: {}\n", key, s)),
                    None => prompt.push_str(&format!("- {}: {}\n", key, value)),
                }
            }
        }

        prompt
    }
}
