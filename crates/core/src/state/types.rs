//! # Bus State Types
//!
//! The serializable session record. Persisted as one JSON document per
//! session; skills missing from an older document are backfilled at `empty`
//! on load, so the shape stays forward-compatible as the catalog grows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Coarse session stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    SkillSelected,
    SkillDone,
    Error,
}

/// Execution status of a single catalog skill within the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillStatus {
    Empty,
    Running,
    Done,
    Error,
    Skipped,
}

/// Readiness of a produced context artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStatus {
    Pending,
    Ready,
    Failed,
}

/// Latest artifact record for one context type.
///
/// `created_at` is set on first write and never changes; `updated_at` and
/// `status` move on every subsequent write. Entries are never deleted within
/// a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEntry {
    /// Artifact location.
    #[serde(rename = "ref")]
    pub artifact_ref: String,
    /// Skill that produced the artifact.
    pub producer: String,
    pub status: ContextStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Current mapping from context type to its latest artifact record. Later
/// writes for the same type overwrite in place.
pub type ContextIndex = BTreeMap<String, ContextEntry>;

/// The durable session record.
///
/// `pending_user_input` is a semantic lock: it holds at most the one
/// unconsumed user utterance of the current turn. It is cleared exactly when
/// that message has been consumed by a successful skill run or handled by a
/// terminal no-op/decline, and preserved across clarifying questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusState {
    pub session_id: Uuid,
    pub stage: Stage,
    pub selected_skill: Option<String>,
    /// Pre-seeded with every catalog skill at `empty`.
    pub skills: BTreeMap<String, SkillStatus>,
    #[serde(default)]
    pub context_index: ContextIndex,
    pub last_output_ref: Option<String>,
    pub pending_user_input: Option<String>,
}

impl BusState {
    /// Fresh session: new id, all listed skills at `empty`, nothing pending.
    pub fn fresh<'a>(skill_names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            stage: Stage::Idle,
            selected_skill: None,
            skills: skill_names
                .into_iter()
                .map(|name| (name.to_string(), SkillStatus::Empty))
                .collect(),
            context_index: ContextIndex::new(),
            last_output_ref: None,
            pending_user_input: None,
        }
    }
}
