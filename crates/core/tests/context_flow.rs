//! Context association and isolation suite: exercises the full turn loop
//! against an in-memory store and a scripted completion client.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use courseflow_core::engine::Engine;
use courseflow_core::error::CoreError;
use courseflow_core::models::CompletionClient;
use courseflow_core::skills::builtin_catalog;
use courseflow_core::state::{
    BusState, ContextEntry, ContextStatus, MemoryStore, SkillStatus, Stage,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Pops scripted completions front-to-back and records every prompt it saw.
struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    image_bytes: usize,
}

impl ScriptedLlm {
    fn new(replies: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            image_bytes: 4096,
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err("script exhausted".to_string()));
        next.map_err(|e| anyhow::anyhow!(e))
    }

    async fn generate_image(&self, _prompt: &str, output_path: &Path) -> Result<()> {
        tokio::fs::write(output_path, vec![0u8; self.image_bytes]).await?;
        Ok(())
    }
}

fn call_skill(name: &str) -> Result<String, String> {
    Ok(format!(r#"{{"action": "call_skill", "skill_name": "{name}"}}"#))
}

fn engine(llm: Arc<ScriptedLlm>, outputs: &Path) -> Engine {
    Engine::new(
        builtin_catalog().unwrap(),
        Box::new(MemoryStore::new()),
        llm,
        outputs,
    )
    .unwrap()
}

fn seeded_engine(llm: Arc<ScriptedLlm>, outputs: &Path, state: BusState) -> Engine {
    Engine::new(
        builtin_catalog().unwrap(),
        Box::new(MemoryStore::with_state(state)),
        llm,
        outputs,
    )
    .unwrap()
}

fn ready_entry(path: &Path, producer: &str) -> ContextEntry {
    ContextEntry {
        artifact_ref: path.to_string_lossy().to_string(),
        producer: producer.to_string(),
        status: ContextStatus::Ready,
        description: String::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn dependent_skill_is_blocked_on_empty_index() {
    let outputs = tempfile::tempdir().unwrap();
    // The reasoner wrongly proposes the dependent skill; the deterministic
    // guard must downgrade it before anything runs.
    let llm = ScriptedLlm::new(vec![call_skill("script_from_transcript")]);
    let engine = engine(llm, outputs.path());

    let outcome = engine
        .handle_message("turn my transcript into a script")
        .await
        .unwrap();

    assert!(outcome.reply.contains("missing required context: transcript"));
    assert!(outcome.output_files.is_empty());

    let state = engine.state().await;
    // Clarifying question: the pending input stays locked.
    assert_eq!(
        state.pending_user_input.as_deref(),
        Some("turn my transcript into a script")
    );
    assert_eq!(
        state.skills[&"script_from_transcript".to_string()],
        SkillStatus::Empty
    );
}

#[tokio::test]
async fn produced_context_unlocks_dependent_skill() {
    let outputs = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new(vec![
        // Turn 1: pick the producer, then its execution completion.
        call_skill("transcript_generation"),
        Ok("# Photosynthesis transcript\n\nHello class, today we cover...".to_string()),
        // Turn 2: pick the consumer, then its execution completion.
        call_skill("script_from_transcript"),
        Ok("| timeline | visuals | narration |\n|---|---|---|".to_string()),
    ]);
    let engine = engine(llm.clone(), outputs.path());

    let first = engine
        .handle_message("write a transcript about photosynthesis")
        .await
        .unwrap();
    assert_eq!(first.output_files.len(), 1);

    let state = engine.state().await;
    let transcript = &state.context_index["transcript"];
    assert_eq!(transcript.status, ContextStatus::Ready);
    assert_eq!(transcript.producer, "transcript_generation");
    assert!(Path::new(&transcript.artifact_ref).exists());
    assert!(state.pending_user_input.is_none());

    let second = engine
        .handle_message("turn that transcript into a tabular script")
        .await
        .unwrap();
    assert_eq!(second.output_files.len(), 1);

    let state = engine.state().await;
    assert_eq!(state.context_index["script"].status, ContextStatus::Ready);
    assert_eq!(state.stage, Stage::SkillDone);
    assert!(state.pending_user_input.is_none());

    // The consumer's execution prompt carried the transcript section before
    // the user-request section.
    let prompts = llm.prompts();
    let exec_prompt = prompts.last().unwrap();
    let transcript_at = exec_prompt.find("=== transcript ===").unwrap();
    let request_at = exec_prompt.find("=== user request ===").unwrap();
    assert!(transcript_at < request_at);
    assert!(exec_prompt.contains("Hello class"));
}

#[tokio::test]
async fn no_action_consumes_pending_input() {
    let outputs = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new(vec![Ok(
        r#"{"action": "no_action", "reason": "nothing to do"}"#.to_string()
    )]);
    let engine = engine(llm, outputs.path());

    let outcome = engine.handle_message("thanks!").await.unwrap();
    assert_eq!(outcome.reply, "nothing to do");
    assert!(engine.state().await.pending_user_input.is_none());
}

#[tokio::test]
async fn execution_failure_marks_skill_and_context_keeps_pending_input() {
    let outputs = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new(vec![
        call_skill("transcript_generation"),
        Err("400 Bad Request".to_string()),
    ]);
    let engine = engine(llm, outputs.path());

    let err = engine
        .handle_message("write a transcript about volcanoes")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Capability(_)));

    let state = engine.state().await;
    assert_eq!(
        state.skills[&"transcript_generation".to_string()],
        SkillStatus::Error
    );
    assert_eq!(state.stage, Stage::Error);
    // The skill did not consume the input.
    assert_eq!(
        state.pending_user_input.as_deref(),
        Some("write a transcript about volcanoes")
    );
    // No transcript entry was fabricated for the failed run.
    assert!(!state.context_index.contains_key("transcript"));
}

#[tokio::test]
async fn independent_task_does_not_touch_prior_context() {
    let outputs = tempfile::tempdir().unwrap();

    // Seed a session that already produced a transcript and a script.
    let transcript_path = outputs.path().join("transcript.md");
    let script_path = outputs.path().join("script.md");
    std::fs::write(&transcript_path, "# Photosynthesis transcript\n\nHello class...").unwrap();
    std::fs::write(&script_path, "| timeline | visuals | narration |").unwrap();

    let catalog = builtin_catalog().unwrap();
    let mut seeded = BusState::fresh(catalog.names());
    seeded.context_index.insert(
        "transcript".to_string(),
        ready_entry(&transcript_path, "transcript_generation"),
    );
    seeded.context_index.insert(
        "script".to_string(),
        ready_entry(&script_path, "script_from_transcript"),
    );

    let llm = ScriptedLlm::new(vec![
        call_skill("image_generation"),
        Ok("a sunlit forest, watercolor style, wide shot".to_string()),
    ]);
    let engine = seeded_engine(llm, outputs.path(), seeded);

    let outcome = engine
        .handle_message("generate a picture of a forest")
        .await
        .unwrap();
    assert_eq!(outcome.output_files.len(), 1);

    let state = engine.state().await;
    // All three context types coexist; earlier entries are untouched.
    for key in ["transcript", "script", "image"] {
        assert!(state.context_index.contains_key(key), "missing {key}");
    }
    assert_eq!(state.context_index["image"].producer, "image_generation");
    assert_eq!(
        state.context_index["transcript"].producer,
        "transcript_generation"
    );

    // The image prompt sidecar stays focused on the request: no leakage from
    // unrelated context artifacts.
    let sidecar =
        std::fs::read_to_string(outputs.path().join("illustration_prompt.txt")).unwrap();
    assert!(sidecar.contains("forest"));
    assert!(!sidecar.contains("Photosynthesis"));
}

#[tokio::test]
async fn session_survives_reopen_with_grown_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let session_id = {
        let llm = ScriptedLlm::new(vec![
            call_skill("transcript_generation"),
            Ok("transcript body".to_string()),
        ]);
        let engine = Engine::new(
            builtin_catalog().unwrap(),
            Box::new(courseflow_core::state::FileStore::new(&state_path)),
            llm,
            dir.path().join("outputs"),
        )
        .unwrap();
        engine.handle_message("write a transcript").await.unwrap();
        engine.state().await.session_id
    };

    // Reopen from disk: same session, produced context intact, statuses kept.
    let llm = ScriptedLlm::new(vec![]);
    let engine = Engine::new(
        builtin_catalog().unwrap(),
        Box::new(courseflow_core::state::FileStore::new(&state_path)),
        llm,
        dir.path().join("outputs"),
    )
    .unwrap();
    let state = engine.state().await;
    assert_eq!(state.session_id, session_id);
    assert_eq!(
        state.skills[&"transcript_generation".to_string()],
        SkillStatus::Done
    );
    assert_eq!(state.context_index["transcript"].status, ContextStatus::Ready);

    let trace = std::fs::read_to_string(dir.path().join("outputs").join("context_trace.log"));
    assert!(trace.unwrap().contains("[dispatch]"));
}
