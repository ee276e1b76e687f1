//! Agent domain: capabilities and the template registry agents are built from.

pub mod capability;
pub mod template;

pub use capability::Capability;
pub use template::{AgentTemplate, CapabilityStrength, TemplateRegistry};
