//! # Dispatch Decisions
//!
//! The four terminal decision kinds and the tolerant parser for reasoning
//! replies. The wire tags (`call_skill`, `ask_user`, `no_action`, `refuse`)
//! are the contract with the reasoning prompt.

use serde::{Deserialize, Serialize};

/// The sole output of a dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
    /// Run exactly one skill.
    #[serde(rename = "call_skill")]
    RunSkill { skill_name: String },
    /// Ask a clarifying question; the pending input stays locked.
    AskUser {
        question: String,
        #[serde(default)]
        options: Vec<String>,
    },
    /// Terminal decline; consumes the pending input.
    #[serde(rename = "refuse")]
    Decline {
        #[serde(default)]
        reason: String,
    },
    /// Terminal no-op; consumes the pending input.
    #[serde(rename = "no_action")]
    NoOp {
        #[serde(default)]
        reason: String,
    },
}

/// Parse a reasoning reply into a decision.
///
/// Accepts either a direct JSON object or an embedded fragment between the
/// first `{` and the last `}` in free text. Any other shape is a parse
/// failure.
pub fn parse_decision(text: &str) -> Option<Decision> {
    if let Ok(decision) = serde_json::from_str(text) {
        return Some(decision);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}
