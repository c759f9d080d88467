//! # Courseflow Skills
//!
//! The static skill catalog: immutable descriptors for every unit of work the
//! dispatcher may select, plus the prompt templates that drive them.
//!
//! Skills are tagged data, not trait objects. A composite "workflow" skill is
//! an ordinary descriptor whose `sub_steps` list references other catalog
//! entries in order.

pub mod builtin;
pub mod catalog;
pub mod descriptor;
pub mod prompts;

pub use builtin::builtin_catalog;
pub use catalog::Catalog;
pub use descriptor::{OutputKind, SkillDescriptor};
