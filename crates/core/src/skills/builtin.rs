//! # Builtin Catalog
//!
//! The course-production skill set. The catalog is static data: nothing here
//! carries behavior beyond its descriptor fields.

use super::catalog::Catalog;
use super::descriptor::{OutputKind, SkillDescriptor};
use super::prompts;
use crate::error::CoreError;

fn text_skill(
    name: &str,
    description: &str,
    intent_description: &str,
    required_context: &[&str],
    trigger_keywords: &[&str],
    prompt_template: &str,
    output_path: &str,
    output_context_type: &str,
    output_description: &str,
) -> SkillDescriptor {
    SkillDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        intent_description: intent_description.to_string(),
        required_context: required_context.iter().map(|s| s.to_string()).collect(),
        trigger_keywords: trigger_keywords.iter().map(|s| s.to_string()).collect(),
        prompt_template: prompt_template.to_string(),
        output_path: output_path.to_string(),
        output_kind: OutputKind::Text,
        output_context_type: output_context_type.to_string(),
        output_description: output_description.to_string(),
        sub_steps: Vec::new(),
    }
}

/// Build the builtin course-production catalog.
pub fn builtin_catalog() -> Result<Catalog, CoreError> {
    let mut skills = vec![
        text_skill(
            "course_goal_definition",
            "Define course goals and learning outcomes from course information.",
            "Use when the user wants to pin down learning goals, expected outcomes, \
             or a competency model. Input is the course topic, audience, and duration.",
            &[],
            &["course goal", "learning goal", "define goals", "goal definition"],
            prompts::COURSE_GOAL_DEFINITION,
            "course_goal.md",
            "course_goal",
            "Course goals and learning outcomes",
        ),
        text_skill(
            "course_design_plan",
            "Generate a course design plan from confirmed course goals.",
            "Use when the user wants a design plan built on already-defined goals: \
             chapter structure, modules, timing, learning path.",
            &["course_goal"],
            &["design plan", "course design", "plan the course"],
            prompts::COURSE_DESIGN_PLAN,
            "design_plan.md",
            "design_plan",
            "Course design plan",
        ),
        text_skill(
            "course_plan_review",
            "Review a course design plan and provide feedback.",
            "Use when the user wants the generated design plan reviewed, with a \
             verdict and revision suggestions.",
            &["design_plan"],
            &["review plan", "plan review", "check the plan"],
            prompts::COURSE_PLAN_REVIEW,
            "design_review.md",
            "design_review",
            "Course design plan review report",
        ),
        text_skill(
            "transcript_generation",
            "Write a verbatim teaching transcript for a topic.",
            "Use when the user wants spoken-style lecture text for a topic, \
             with no prerequisite material.",
            &[],
            &["transcript", "narration", "lecture text", "verbatim"],
            prompts::TRANSCRIPT_GENERATION,
            "transcript.md",
            "transcript",
            "Verbatim teaching transcript",
        ),
        text_skill(
            "script_from_transcript",
            "Rework a transcript into a tabular teaching video script.",
            "Use when the user wants an existing transcript turned into a \
             structured video script with timeline, visuals, and narration.",
            &["transcript"],
            &["script", "video script", "tabular script"],
            prompts::SCRIPT_FROM_TRANSCRIPT,
            "script.md",
            "script",
            "Tabular teaching video script",
        ),
        text_skill(
            "storyboard_from_script",
            "Generate a shot-by-shot storyboard from a video script.",
            "Use when the user wants the script broken into shots with framing, \
             on-screen text, and pacing.",
            &["script"],
            &["storyboard", "shot list", "storyboard design"],
            prompts::STORYBOARD_FROM_SCRIPT,
            "storyboard.md",
            "storyboard",
            "Shot-by-shot storyboard",
        ),
        SkillDescriptor {
            name: "image_generation".to_string(),
            description: "Generate a standalone educational illustration.".to_string(),
            intent_description: "Use when the user asks for a picture or illustration. \
                                 Independent of any prior material."
                .to_string(),
            required_context: Vec::new(),
            trigger_keywords: ["image", "illustration", "picture", "draw"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            prompt_template: prompts::IMAGE_GENERATION.to_string(),
            output_path: "illustration.png".to_string(),
            output_kind: OutputKind::Image,
            output_context_type: "image".to_string(),
            output_description: "Educational illustration".to_string(),
            sub_steps: Vec::new(),
        },
    ];

    let mut workflow = text_skill(
        "course_production_workflow",
        "Full course production pipeline from goals to storyboard.",
        "Use when the user wants the complete production flow run end to end.",
        &[],
        &["full workflow", "entire pipeline", "produce the course", "course production"],
        prompts::COURSE_PRODUCTION_WORKFLOW,
        "workflow_summary.md",
        "workflow_summary",
        "Course production workflow summary",
    );
    workflow.sub_steps = [
        "course_goal_definition",
        "course_design_plan",
        "course_plan_review",
        "transcript_generation",
        "script_from_transcript",
        "storyboard_from_script",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    skills.push(workflow);

    Catalog::new(skills)
}
