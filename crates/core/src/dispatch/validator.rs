//! # Dependency Validator
//!
//! Pure hard-constraint check: a skill may only run when every one of its
//! required context types is present and ready. The reasoning step is never
//! trusted for this; the dispatcher re-runs the validator on the actual
//! context index before acting on any suggestion.

use crate::skills::SkillDescriptor;
use crate::state::{ContextIndex, ContextStatus};

/// Check a skill's declared requirements against the current context index.
///
/// Requirements are checked in declaration order and only the first failing
/// one is reported.
pub fn validate(skill: &SkillDescriptor, context_index: &ContextIndex) -> Result<(), String> {
    for required in &skill.required_context {
        match context_index.get(required) {
            None => return Err(format!("missing required context: {required}")),
            Some(entry) if entry.status != ContextStatus::Ready => {
                return Err(format!("context {required} not ready"))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::OutputKind;
    use crate::state::ContextEntry;
    use chrono::Utc;

    fn skill(required: &[&str]) -> SkillDescriptor {
        SkillDescriptor {
            name: "s".to_string(),
            description: String::new(),
            intent_description: String::new(),
            required_context: required.iter().map(|s| s.to_string()).collect(),
            trigger_keywords: Vec::new(),
            prompt_template: "{user_input}".to_string(),
            output_path: "s.md".to_string(),
            output_kind: OutputKind::Text,
            output_context_type: "s".to_string(),
            output_description: String::new(),
            sub_steps: Vec::new(),
        }
    }

    fn entry(status: ContextStatus) -> ContextEntry {
        ContextEntry {
            artifact_ref: "outputs/x.md".to_string(),
            producer: "p".to_string(),
            status,
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_requirements_always_pass() {
        assert!(validate(&skill(&[]), &ContextIndex::new()).is_ok());
    }

    #[test]
    fn absent_type_is_reported_as_missing() {
        let err = validate(&skill(&["transcript"]), &ContextIndex::new()).unwrap_err();
        assert_eq!(err, "missing required context: transcript");
    }

    #[test]
    fn unready_type_is_reported_as_not_ready() {
        for status in [ContextStatus::Pending, ContextStatus::Failed] {
            let mut index = ContextIndex::new();
            index.insert("transcript".to_string(), entry(status));
            let err = validate(&skill(&["transcript"]), &index).unwrap_err();
            assert_eq!(err, "context transcript not ready");
        }
    }

    #[test]
    fn first_failure_in_declaration_order_wins() {
        let mut index = ContextIndex::new();
        index.insert("script".to_string(), entry(ContextStatus::Failed));
        // "transcript" is declared first and absent; "script" is unready.
        let err = validate(&skill(&["transcript", "script"]), &index).unwrap_err();
        assert_eq!(err, "missing required context: transcript");
    }

    #[test]
    fn all_ready_passes() {
        let mut index = ContextIndex::new();
        index.insert("transcript".to_string(), entry(ContextStatus::Ready));
        index.insert("script".to_string(), entry(ContextStatus::Ready));
        assert!(validate(&skill(&["transcript", "script"]), &index).is_ok());
    }
}
