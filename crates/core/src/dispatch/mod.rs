//! # Dispatcher
//!
//! Routes one user message to exactly one decision. A reasoning request goes
//! to the completion capability first; any `call_skill` suggestion is then
//! re-validated against the actual context index, because correctness of the
//! state transitions rests on the deterministic guard, never on the
//! reasoner's compliance. If reasoning fails or stays unparseable after two
//! attempts, a keyword heuristic takes over.

pub mod decision;
pub mod heuristic;
pub mod validator;

pub use decision::{parse_decision, Decision};
pub use heuristic::heuristic_dispatch;
pub use validator::validate;

use crate::models::CompletionClient;
use crate::skills::{prompts, Catalog};
use crate::state::BusState;
use serde_json::json;

/// Attempts to obtain a parseable decision from the reasoner before the
/// heuristic fallback kicks in.
const REASONING_ATTEMPTS: usize = 2;

/// Build the reasoning prompt: catalog metadata and context-index metadata
/// only - artifact content never reaches the reasoner.
fn reasoning_prompt(user_message: &str, snapshot: &BusState, catalog: &Catalog) -> String {
    let skills_info: Vec<_> = catalog
        .skills()
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "description": s.description,
                "intent_description": s.intent_description,
                "required_context": s.required_context,
                "output_kind": s.output_kind,
            })
        })
        .collect();

    let bus_info = json!({
        "stage": snapshot.stage,
        "context_index": snapshot.context_index,
        "available_types": snapshot.context_index.keys().collect::<Vec<_>>(),
    });

    format!(
        "{}\n\n{}\n\navailable_skills:\n{}\n\nuser_message:\n{}\n\nbus_state:\n{}\n",
        prompts::DISPATCHER,
        prompts::DISPATCHER_CONSTRAINTS,
        serde_json::to_string_pretty(&skills_info).unwrap_or_default(),
        user_message,
        serde_json::to_string_pretty(&bus_info).unwrap_or_default(),
    )
}

/// Enforce the hard dependency check on a reasoned decision.
///
/// A `call_skill` whose requirements are unmet is downgraded to a clarifying
/// question naming the failed requirement; the violation itself is never
/// surfaced as an error. Unknown skill names pass through untouched - the
/// engine treats them as a protocol error.
fn enforce_dependencies(decision: Decision, snapshot: &BusState, catalog: &Catalog) -> Decision {
    if let Decision::RunSkill { skill_name } = &decision {
        if let Some(skill) = catalog.by_name(skill_name) {
            if let Err(reason) = validate(skill, &snapshot.context_index) {
                tracing::debug!(skill = %skill_name, %reason, "downgrading reasoned decision");
                return Decision::AskUser {
                    question: format!(
                        "Cannot run {skill_name}: {reason}. Complete the prerequisite step first."
                    ),
                    options: Vec::new(),
                };
            }
        }
    }
    decision
}

/// Produce exactly one decision for the user message.
pub async fn dispatch(
    user_message: &str,
    snapshot: &BusState,
    catalog: &Catalog,
    llm: &dyn CompletionClient,
) -> Decision {
    let prompt = reasoning_prompt(user_message, snapshot, catalog);

    for attempt in 0..REASONING_ATTEMPTS {
        match llm.complete(&prompt).await {
            Ok(reply) => {
                if let Some(decision) = parse_decision(&reply) {
                    return enforce_dependencies(decision, snapshot, catalog);
                }
                tracing::debug!(attempt, "unparseable reasoning reply");
            }
            Err(err) => {
                tracing::warn!(attempt, error = %err, "reasoning capability failed");
                break;
            }
        }
    }

    heuristic_dispatch(user_message, catalog.skills())
}
