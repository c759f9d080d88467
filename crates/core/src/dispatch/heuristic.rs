//! # Heuristic Fallback
//!
//! Deterministic keyword matcher used when the reasoning capability errors
//! out or produces nothing parseable. It never runs a skill on its own: even
//! an unambiguous single match comes back as a confirmation question.

use super::decision::Decision;
use crate::skills::SkillDescriptor;

/// Case-insensitive substring scan over skill names (underscores normalized
/// to spaces) and trigger keywords.
pub fn heuristic_dispatch(user_message: &str, skills: &[SkillDescriptor]) -> Decision {
    let lowered = user_message.to_lowercase();
    let mut matches: Vec<String> = Vec::new();

    for skill in skills {
        let name = skill.name.to_lowercase();
        if lowered.contains(&name) || lowered.contains(&name.replace('_', " ")) {
            matches.push(skill.name.clone());
            continue;
        }
        if skill
            .trigger_keywords
            .iter()
            .any(|kw| lowered.contains(&kw.to_lowercase()))
        {
            matches.push(skill.name.clone());
        }
    }

    match matches.len() {
        0 => Decision::AskUser {
            question: "I am not sure which task you want. Please describe your goal."
                .to_string(),
            options: Vec::new(),
        },
        1 => Decision::AskUser {
            question: "This looks like the task below. Please confirm before I run it."
                .to_string(),
            options: matches,
        },
        _ => Decision::AskUser {
            question: "Multiple skills match. Which one should I run?".to_string(),
            options: matches,
        },
    }
}
