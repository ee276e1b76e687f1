//! Agent templates: the static registry agents are spawned from

use super::capability::Capability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A capability with the strength an agent brings to it (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityStrength {
    pub capability: Capability,
    pub strength: f64,
}

/// Blueprint for a specialized reasoning agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTemplate {
    pub id: String,
    pub name: String,
    pub capabilities: Vec<CapabilityStrength>,
}

impl AgentTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability, strength: f64) -> Self {
        self.capabilities.push(CapabilityStrength {
            capability,
            strength: strength.clamp(0.0, 1.0),
        });
        self
    }

    /// Capability tags without strengths.
    pub fn tags(&self) -> BTreeSet<Capability> {
        self.capabilities.iter().map(|c| c.capability).collect()
    }

    /// How many of `required` this template declares.
    pub fn matching_count(&self, required: &BTreeSet<Capability>) -> usize {
        self.capabilities
            .iter()
            .filter(|c| required.contains(&c.capability))
            .count()
    }

    /// The capability this template is strongest in; ties keep declaration order.
    pub fn primary(&self) -> Option<Capability> {
        self.capabilities
            .iter()
            .fold(None::<&CapabilityStrength>, |best, c| match best {
                Some(b) if b.strength >= c.strength => Some(b),
                _ => Some(c),
            })
            .map(|c| c.capability)
    }
}

/// Read-only set of templates available for spawning
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRegistry {
    templates: Vec<AgentTemplate>,
}

impl TemplateRegistry {
    pub fn new(templates: Vec<AgentTemplate>) -> Self {
        Self { templates }
    }

    /// The built-in specialist lineup.
    pub fn builtin() -> Self {
        use Capability::*;
        Self::new(vec![
            AgentTemplate::new("analyst", "Analytical Reasoner")
                .with_capability(LogicalAnalysis, 0.95)
                .with_capability(Reasoning, 0.9)
                .with_capability(CriticalEvaluation, 0.6),
            AgentTemplate::new("synthesizer", "Creative Synthesizer")
                .with_capability(CreativeSynthesis, 0.95)
                .with_capability(Integration, 0.8)
                .with_capability(Reasoning, 0.6),
            AgentTemplate::new("historian", "Temporal Analyst")
                .with_capability(TemporalAnalysis, 0.95)
                .with_capability(Reasoning, 0.7)
                .with_capability(Integration, 0.5),
            AgentTemplate::new("critic", "Critical Evaluator")
                .with_capability(CriticalEvaluation, 0.95)
                .with_capability(Reasoning, 0.75)
                .with_capability(LogicalAnalysis, 0.7),
            AgentTemplate::new("integrator", "Integrative Generalist")
                .with_capability(Integration, 0.9)
                .with_capability(Reasoning, 0.8)
                .with_capability(CreativeSynthesis, 0.5)
                .with_capability(TemporalAnalysis, 0.4),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&AgentTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentTemplate> {
        self.templates.iter()
    }

    pub fn as_slice(&self) -> &[AgentTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
