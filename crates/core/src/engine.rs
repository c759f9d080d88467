//! # Engine
//!
//! The per-turn loop: take one user message, dispatch it, optionally run the
//! selected skill, and leave the bus in a consistent, fully persisted state.
//! Every failure class resolves to a well-formed outcome or a typed error -
//! nothing here is fatal to the process.

use crate::assemble::{assemble, ArtifactReader, FsArtifactReader};
use crate::dispatch::{dispatch, Decision};
use crate::error::CoreError;
use crate::executor::execute;
use crate::models::CompletionClient;
use crate::skills::Catalog;
use crate::state::{BusState, StateBus, StateStore};
use crate::trace::TraceLog;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What one dispatch cycle hands back to the front end.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TurnOutcome {
    /// Text to show the user; empty after a silent successful run.
    pub reply: String,
    /// Artifacts produced this turn.
    pub output_files: Vec<String>,
    /// Skill-name options accompanying a clarifying question.
    pub options: Vec<String>,
    /// Snapshot after all bus updates of this turn.
    pub bus_state: BusState,
}

/// Single-session dispatch engine.
///
/// All mutating bus work happens behind one async mutex, so concurrent
/// callers of the same engine are serialized per session.
pub struct Engine {
    catalog: Catalog,
    bus: Mutex<StateBus>,
    llm: Arc<dyn CompletionClient>,
    reader: Box<dyn ArtifactReader>,
    outputs_dir: PathBuf,
    trace: TraceLog,
}

impl Engine {
    pub fn new(
        catalog: Catalog,
        store: Box<dyn StateStore>,
        llm: Arc<dyn CompletionClient>,
        outputs_dir: impl Into<PathBuf>,
    ) -> Result<Self, CoreError> {
        let bus = StateBus::open(store, catalog.names())?;
        let outputs_dir = outputs_dir.into();
        let trace = TraceLog::new(outputs_dir.join("context_trace.log"));
        Ok(Self {
            catalog,
            bus: Mutex::new(bus),
            llm,
            reader: Box::new(FsArtifactReader),
            outputs_dir,
            trace,
        })
    }

    /// Replace the trace sink (tests, CLI one-shots).
    pub fn with_trace(mut self, trace: TraceLog) -> Self {
        self.trace = trace;
        self
    }

    /// Current bus snapshot.
    pub async fn state(&self) -> BusState {
        self.bus.lock().await.snapshot()
    }

    /// Run one full dispatch cycle for a user message.
    pub async fn handle_message(&self, message: &str) -> Result<TurnOutcome, CoreError> {
        let mut bus = self.bus.lock().await;

        if !message.trim().is_empty() {
            bus.set_pending_input(Some(message.to_string()))?;
        }
        let snapshot = bus.snapshot();

        let decision = dispatch(message, &snapshot, &self.catalog, &*self.llm).await;
        self.trace.record(&format!(
            "[dispatch] decision={}",
            serde_json::to_string(&decision).unwrap_or_default()
        ));

        match decision {
            Decision::RunSkill { skill_name } => {
                self.run_skill(&mut bus, &snapshot, &skill_name, message).await
            }
            Decision::AskUser { question, options } => {
                // Pending input stays locked: the user has not been answered.
                Ok(TurnOutcome {
                    reply: question,
                    output_files: Vec::new(),
                    options,
                    bus_state: bus.snapshot(),
                })
            }
            Decision::NoOp { reason } | Decision::Decline { reason } => {
                bus.clear_pending_input()?;
                Ok(TurnOutcome {
                    reply: reason,
                    output_files: Vec::new(),
                    options: Vec::new(),
                    bus_state: bus.snapshot(),
                })
            }
        }
    }

    async fn run_skill(
        &self,
        bus: &mut StateBus,
        snapshot: &BusState,
        skill_name: &str,
        message: &str,
    ) -> Result<TurnOutcome, CoreError> {
        let Some(skill) = self.catalog.by_name(skill_name) else {
            bus.set_error()?;
            return Err(CoreError::UnknownSkill(skill_name.to_string()));
        };

        bus.mark_skill_running(&skill.name)?;

        let input_text = match assemble(skill, message, &snapshot.context_index, &*self.reader) {
            Ok(text) => {
                self.trace.record(&format!(
                    "[prepare_input] skill={} input_bytes={}",
                    skill.name,
                    text.len()
                ));
                text
            }
            Err(CoreError::ContextMissing { types }) => {
                // Artifacts vanished between validation and assembly. Shaped
                // like a clarifying question; the pending input stays locked.
                self.trace.record(&format!(
                    "[prepare_input] skill={} missing_context={}",
                    skill.name,
                    types.join(",")
                ));
                bus.mark_skill_error(&skill.name, None)?;
                return Ok(TurnOutcome {
                    reply: CoreError::ContextMissing { types }.to_string(),
                    output_files: Vec::new(),
                    options: Vec::new(),
                    bus_state: bus.snapshot(),
                });
            }
            Err(other) => return Err(other),
        };

        match execute(skill, &input_text, &*self.llm, &self.outputs_dir).await {
            Ok(output_path) => {
                let output_ref = output_path.to_string_lossy().to_string();
                bus.mark_skill_done(
                    &skill.name,
                    &output_ref,
                    &skill.output_context_type,
                    &skill.output_description,
                )?;
                // The skill consumed the pending input.
                bus.clear_pending_input()?;
                Ok(TurnOutcome {
                    reply: String::new(),
                    output_files: vec![output_ref],
                    options: Vec::new(),
                    bus_state: bus.snapshot(),
                })
            }
            Err(err) => {
                // The skill did not consume the input; the caller decides
                // what happens to the pending slot.
                bus.mark_skill_error(&skill.name, Some(&skill.output_context_type))?;
                Err(err)
            }
        }
    }
}
