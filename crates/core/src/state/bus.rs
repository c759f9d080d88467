//! # Global State Bus
//!
//! Exclusive owner of the session record. Every mutating operation computes
//! the new state and persists the full snapshot through the store before
//! returning; no partial state is ever observable across a crash boundary.

use super::store::StateStore;
use super::types::{BusState, ContextEntry, ContextStatus, SkillStatus, Stage};
use crate::error::CoreError;
use chrono::Utc;

/// Durable session state bus.
///
/// Context entries and skill-status entries are never removed once created.
pub struct StateBus {
    store: Box<dyn StateStore>,
    state: BusState,
}

impl StateBus {
    /// Load the last persisted state or initialize a fresh session.
    ///
    /// Catalog skills missing from a loaded document are backfilled at
    /// `empty`; existing entries are never overwritten.
    pub fn open<'a>(
        store: Box<dyn StateStore>,
        skill_names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, CoreError> {
        let loaded = store.load().map_err(CoreError::Storage)?;
        let mut state = match loaded {
            Some(state) => state,
            None => BusState::fresh(std::iter::empty()),
        };
        for name in skill_names {
            state
                .skills
                .entry(name.to_string())
                .or_insert(SkillStatus::Empty);
        }
        let bus = Self { store, state };
        bus.persist()?;
        Ok(bus)
    }

    /// Immutable snapshot of the current state.
    pub fn snapshot(&self) -> BusState {
        self.state.clone()
    }

    fn persist(&self) -> Result<(), CoreError> {
        self.store.save(&self.state).map_err(CoreError::Storage)
    }

    /// Overwrite the single-slot pending-input lock.
    pub fn set_pending_input(&mut self, text: Option<String>) -> Result<(), CoreError> {
        self.state.pending_user_input = text;
        self.persist()
    }

    /// Release the lock: the current input was consumed by a successful skill
    /// run or handled by a terminal no-op/decline decision.
    pub fn clear_pending_input(&mut self) -> Result<(), CoreError> {
        self.state.pending_user_input = None;
        self.persist()
    }

    /// Record that a skill was selected and is now executing.
    pub fn mark_skill_running(&mut self, name: &str) -> Result<(), CoreError> {
        self.state
            .skills
            .insert(name.to_string(), SkillStatus::Running);
        self.state.selected_skill = Some(name.to_string());
        self.state.stage = Stage::SkillSelected;
        self.persist()
    }

    /// Record a successful run and upsert its artifact into the context index.
    ///
    /// A pre-existing entry for `context_type` keeps its `created_at`; only
    /// `updated_at`, the reference, and the status move.
    pub fn mark_skill_done(
        &mut self,
        name: &str,
        output_ref: &str,
        context_type: &str,
        description: &str,
    ) -> Result<(), CoreError> {
        self.state.skills.insert(name.to_string(), SkillStatus::Done);

        let now = Utc::now();
        let created_at = self
            .state
            .context_index
            .get(context_type)
            .map(|existing| existing.created_at)
            .unwrap_or(now);
        self.state.context_index.insert(
            context_type.to_string(),
            ContextEntry {
                artifact_ref: output_ref.to_string(),
                producer: name.to_string(),
                status: ContextStatus::Ready,
                description: description.to_string(),
                created_at,
                updated_at: now,
            },
        );

        self.state.last_output_ref = Some(output_ref.to_string());
        self.state.stage = Stage::SkillDone;
        self.persist()
    }

    /// Record a failed run. If `context_type` names an existing index entry,
    /// flip it to `failed` and bump its `updated_at`; a missing entry is
    /// never fabricated.
    pub fn mark_skill_error(
        &mut self,
        name: &str,
        context_type: Option<&str>,
    ) -> Result<(), CoreError> {
        self.state
            .skills
            .insert(name.to_string(), SkillStatus::Error);
        self.state.stage = Stage::Error;

        if let Some(context_type) = context_type {
            if let Some(entry) = self.state.context_index.get_mut(context_type) {
                entry.status = ContextStatus::Failed;
                entry.updated_at = Utc::now();
            }
        }
        self.persist()
    }

    pub fn mark_skill_skipped(&mut self, name: &str) -> Result<(), CoreError> {
        self.state
            .skills
            .insert(name.to_string(), SkillStatus::Skipped);
        self.persist()
    }

    pub fn set_stage(&mut self, stage: Stage) -> Result<(), CoreError> {
        self.state.stage = stage;
        self.persist()
    }

    /// Protocol-level failure not attributable to a specific skill.
    pub fn set_error(&mut self) -> Result<(), CoreError> {
        self.set_stage(Stage::Error)
    }
}
