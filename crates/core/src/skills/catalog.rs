//! # Skill Catalog
//!
//! Immutable, validated collection of skill descriptors.

use super::descriptor::SkillDescriptor;
use crate::error::CoreError;
use std::collections::HashSet;

/// The fixed set of skills the dispatcher may choose from.
///
/// Validated once at construction: names are unique and every workflow
/// `sub_steps` reference resolves to a catalog entry.
#[derive(Debug, Clone)]
pub struct Catalog {
    skills: Vec<SkillDescriptor>,
}

impl Catalog {
    /// Build a catalog, enforcing its invariants.
    pub fn new(skills: Vec<SkillDescriptor>) -> Result<Self, CoreError> {
        let mut seen = HashSet::new();
        for skill in &skills {
            if !seen.insert(skill.name.as_str()) {
                return Err(CoreError::Catalog(format!(
                    "duplicate skill name: {}",
                    skill.name
                )));
            }
        }
        for skill in &skills {
            for step in &skill.sub_steps {
                if !seen.contains(step.as_str()) {
                    return Err(CoreError::Catalog(format!(
                        "workflow {} references unknown sub-step: {step}",
                        skill.name
                    )));
                }
            }
        }
        Ok(Self { skills })
    }

    /// Look up a skill by its unique name.
    pub fn by_name(&self, name: &str) -> Option<&SkillDescriptor> {
        self.skills.iter().find(|s| s.name == name)
    }

    /// All descriptors, in catalog order.
    pub fn skills(&self) -> &[SkillDescriptor] {
        &self.skills
    }

    /// Skill names, in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(|s| s.name.as_str())
    }
}
