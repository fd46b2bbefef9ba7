//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Syllabus-to-study-plan instructions
pub const SYLLABUS_PLAN: &str = include_str!("../../prompts/syllabus-plan.pmt");

/// Standing context that pins the current plan in every chat turn
pub const PLAN_CONTEXT: &str = include_str!("../../prompts/plan-context.pmt");

/// Summary instructions for an attached PDF
pub const NOTE_SUMMARY: &str = include_str!("../../prompts/note-summary.pmt");

/// Summary instructions with the notes inlined
pub const NOTE_SUMMARY_TEXT: &str = include_str!("../../prompts/note-summary-text.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "syllabus-plan" => Some(SYLLABUS_PLAN),
        "plan-context" => Some(PLAN_CONTEXT),
        "note-summary" => Some(NOTE_SUMMARY),
        "note-summary-text" => Some(NOTE_SUMMARY_TEXT),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_syllabus_plan() {
        let prompt = get_embedded("syllabus-plan").unwrap();
        assert!(prompt.contains("smart academic planner"));
        assert!(prompt.contains("recommended study hours"));
    }

    #[test]
    fn test_get_embedded_plan_context() {
        let prompt = get_embedded("plan-context").unwrap();
        assert!(prompt.contains("{{plan}}"));
        assert!(prompt.contains("refer to this plan for all subsequent questions"));
    }

    #[test]
    fn test_get_embedded_summaries() {
        assert!(get_embedded("note-summary").unwrap().contains("PDF"));
        assert!(get_embedded("note-summary-text").unwrap().contains("{{notes}}"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
