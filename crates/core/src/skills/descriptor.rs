//! # Skill Descriptors
//!
//! One immutable record per skill: what it needs, what it produces, and how
//! the dispatcher can recognize a request for it.

use serde::{Deserialize, Serialize};

/// Kind of artifact a skill produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Text,
    Image,
}

/// An immutable unit-of-work descriptor, loaded once into the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDescriptor {
    /// Unique key within the catalog.
    pub name: String,
    /// One-line summary shown to the reasoner.
    pub description: String,
    /// When a user request should map to this skill.
    pub intent_description: String,
    /// Context types that must be present and ready before this skill may run,
    /// in declaration order.
    #[serde(default)]
    pub required_context: Vec<String>,
    /// Keywords for the deterministic fallback matcher.
    #[serde(default)]
    pub trigger_keywords: Vec<String>,
    /// Prompt template with a `{user_input}` placeholder.
    pub prompt_template: String,
    /// Artifact filename, relative to the outputs directory.
    pub output_path: String,
    pub output_kind: OutputKind,
    /// Context type this skill's artifact is indexed under.
    pub output_context_type: String,
    /// Human-readable description recorded with the context entry.
    pub output_description: String,
    /// Ordered sub-skill names for composite workflow skills. Empty for plain
    /// skills. Every name must resolve in the catalog.
    #[serde(default)]
    pub sub_steps: Vec<String>,
}

impl SkillDescriptor {
    /// Whether this descriptor is a composite workflow.
    pub fn is_workflow(&self) -> bool {
        !self.sub_steps.is_empty()
    }

    /// Render the prompt template against the assembled input text.
    pub fn render_prompt(&self, input_text: &str) -> String {
        self.prompt_template.replace("{user_input}", input_text)
    }
}
