//! # Input Assembler
//!
//! Builds the final task input for a skill: one section per required context
//! type in declaration order, then the verbatim user message. Fails closed
//! with the full set of missing dependencies, so one response can report
//! every gap at once.

use crate::error::CoreError;
use crate::skills::SkillDescriptor;
use crate::state::ContextIndex;

/// Per-type content cap, in characters.
pub const MAX_CONTEXT_CHARS: usize = 8000;

/// Appended when a section was cut at the cap.
pub const TRUNCATION_MARKER: &str = "\n\n[content truncated]\n";

/// Header for the trailing user-message section.
const USER_REQUEST_HEADER: &str = "user request";

/// Resolves a context reference to artifact content. Injectable so tests can
/// redirect reads; production uses [`FsArtifactReader`].
pub trait ArtifactReader: Send + Sync {
    fn read(&self, artifact_ref: &str) -> std::io::Result<String>;
}

/// Reads artifact references as filesystem paths.
#[derive(Default)]
pub struct FsArtifactReader;

impl ArtifactReader for FsArtifactReader {
    fn read(&self, artifact_ref: &str) -> std::io::Result<String> {
        std::fs::read_to_string(artifact_ref)
    }
}

/// Assemble the input text for `skill`.
///
/// With no declared requirements the raw user message passes through
/// unchanged. Otherwise every requirement is checked before failing: an
/// absent entry, an empty reference, a read error, or whitespace-only
/// content each add the type to the missing set.
pub fn assemble(
    skill: &SkillDescriptor,
    user_message: &str,
    context_index: &ContextIndex,
    reader: &dyn ArtifactReader,
) -> Result<String, CoreError> {
    if skill.required_context.is_empty() {
        return Ok(user_message.to_string());
    }

    let mut parts = Vec::new();
    let mut missing = Vec::new();

    for context_type in &skill.required_context {
        let Some(entry) = context_index.get(context_type) else {
            missing.push(context_type.clone());
            continue;
        };
        if entry.artifact_ref.is_empty() {
            missing.push(context_type.clone());
            continue;
        }
        let content = match reader.read(&entry.artifact_ref) {
            Ok(content) => content,
            Err(_) => {
                missing.push(context_type.clone());
                continue;
            }
        };
        if content.trim().is_empty() {
            missing.push(context_type.clone());
            continue;
        }

        let content = if content.chars().count() > MAX_CONTEXT_CHARS {
            let truncated: String = content.chars().take(MAX_CONTEXT_CHARS).collect();
            format!("{truncated}{TRUNCATION_MARKER}")
        } else {
            content
        };
        parts.push(format!("=== {context_type} ===\n{content}\n"));
    }

    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        return Err(CoreError::ContextMissing { types: missing });
    }

    Ok(format!(
        "{}\n=== {USER_REQUEST_HEADER} ===\n{user_message}",
        parts.join("\n")
    ))
}
