//! # Skill Executor
//!
//! The execution boundary: takes a fully assembled input, drives the
//! generation capability, writes the artifact, and returns its path. All
//! context resolution happens before this call - the executor never reads
//! the context index.

use crate::error::CoreError;
use crate::models::CompletionClient;
use crate::skills::{OutputKind, SkillDescriptor};
use std::path::{Path, PathBuf};

/// Below this size an image artifact is considered a failed generation.
const MIN_IMAGE_BYTES: u64 = 2048;

async fn ensure_parent_dir(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(CoreError::ArtifactIo)?;
    }
    Ok(())
}

/// Sibling path with a suffix before the extension, e.g. `a.png` ->
/// `a_prompt.txt`.
fn sidecar_path(artifact: &Path, suffix: &str) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    artifact.with_file_name(format!("{stem}{suffix}.txt"))
}

async fn generate_text(
    skill: &SkillDescriptor,
    input_text: &str,
    llm: &dyn CompletionClient,
    output_path: &Path,
) -> Result<(), CoreError> {
    let prompt = skill.render_prompt(input_text);
    let content = llm
        .complete(&prompt)
        .await
        .map_err(|e| CoreError::Capability(e.to_string()))?;
    if content.trim().is_empty() {
        return Err(CoreError::Capability(format!(
            "empty completion for skill {}",
            skill.name
        )));
    }
    tokio::fs::write(output_path, content)
        .await
        .map_err(CoreError::ArtifactIo)
}

async fn generate_image(
    skill: &SkillDescriptor,
    input_text: &str,
    llm: &dyn CompletionClient,
    output_path: &Path,
) -> Result<(), CoreError> {
    // Two-step: derive a focused image prompt from the user request, persist
    // it beside the artifact for inspection, then render.
    let prompt = skill.render_prompt(input_text);
    let image_prompt = llm
        .complete(&prompt)
        .await
        .map_err(|e| CoreError::Capability(e.to_string()))?;
    let image_prompt = image_prompt.trim();
    if image_prompt.is_empty() {
        return Err(CoreError::Capability("empty image prompt".to_string()));
    }

    tokio::fs::write(sidecar_path(output_path, "_prompt"), image_prompt)
        .await
        .map_err(CoreError::ArtifactIo)?;

    llm.generate_image(image_prompt, output_path)
        .await
        .map_err(|e| CoreError::Capability(e.to_string()))?;

    let size = tokio::fs::metadata(output_path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    if size < MIN_IMAGE_BYTES {
        return Err(CoreError::Capability(format!(
            "image output is too small ({size} bytes), likely failed"
        )));
    }
    Ok(())
}

/// Execute one skill against its assembled input and return the artifact
/// path. On failure the cause is written to an `*_error.txt` sidecar before
/// the error propagates.
pub async fn execute(
    skill: &SkillDescriptor,
    input_text: &str,
    llm: &dyn CompletionClient,
    outputs_dir: &Path,
) -> Result<PathBuf, CoreError> {
    let output_path = outputs_dir.join(&skill.output_path);
    ensure_parent_dir(&output_path).await?;

    let result = match skill.output_kind {
        OutputKind::Text => generate_text(skill, input_text, llm, &output_path).await,
        OutputKind::Image => generate_image(skill, input_text, llm, &output_path).await,
    };

    if let Err(err) = &result {
        let _ = tokio::fs::write(sidecar_path(&output_path, "_error"), err.to_string()).await;
    }
    result.map(|()| output_path)
}
