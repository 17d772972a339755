//! Splits a model reply into a session summary and a care plan.
//!
//! Two modes share one entry point. `Lenient` looks for any accepted
//! care-plan header spelling and never fails. `Strict` requires the literal
//! [`STRICT_MARKER`] exactly once.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Separator the legacy prompt asks the model to emit
pub const STRICT_MARKER: &str = "CARE PLAN & NEXT STEPS:";

const STRICT_SUMMARY_LABEL: &str = "SESSION SUMMARY:";

/// Care-plan headers that start the second section. Leftmost match wins, so
/// `2. **Care Plan**` is taken whole rather than from its `**`. An unbolded
/// label must be the whole line prefix up to its colon.
const CARE_PLAN_HEADER: &str = concat!(
    r"(?im)",
    r"\*\*[ \t]*(?:2\.[ \t]*)?care plan[^*\n]*\*\*",
    r"|2\.[ \t]*\*\*[ \t]*care plan",
    r"|^[ \t]*(?:2\.[ \t]*)?care plan(?:[ \t]*&[ \t]*next steps)?[ \t]*:",
);

/// One leading section label, numbered and/or bold, optional colon
const LEADING_HEADER: &str = concat!(
    r"(?i)^\s*(?:\d\.[ \t]*)?",
    r"(?:\*\*[ \t]*(?:\d\.[ \t]*)?(?:session summary|care plan)[^*\n]*\*\*",
    r"|(?:session summary|care plan(?:[ \t]*&[ \t]*next steps)?)[ \t]*:)",
    r"[ \t]*:?",
);

fn care_plan_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CARE_PLAN_HEADER).expect("care plan header pattern is valid"))
}

fn leading_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LEADING_HEADER).expect("leading header pattern is valid"))
}

/// How tolerant the splitter is of the reply's structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    Lenient,
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("Invalid response format from Claude API")]
    InvalidFormat,
}

/// The two halves of a reply. `care_plan` is empty when none was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSections {
    pub summary: String,
    pub care_plan: String,
}

pub fn split_response(text: &str, mode: SplitMode) -> Result<SplitSections, SplitError> {
    match mode {
        SplitMode::Lenient => Ok(split_lenient(text)),
        SplitMode::Strict => split_strict(text),
    }
}

fn strip_leading_header(section: &str) -> &str {
    match leading_header().find(section) {
        Some(m) => section[m.end()..].trim(),
        None => section.trim(),
    }
}

fn split_lenient(text: &str) -> SplitSections {
    match care_plan_header().find(text) {
        Some(m) => {
            let (summary, care_plan) = text.split_at(m.start());
            SplitSections {
                summary: strip_leading_header(summary).to_string(),
                care_plan: strip_leading_header(care_plan).to_string(),
            }
        }
        None => SplitSections {
            summary: strip_leading_header(text).to_string(),
            care_plan: String::new(),
        },
    }
}

fn split_strict(text: &str) -> Result<SplitSections, SplitError> {
    let mut parts = text.split(STRICT_MARKER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(summary), Some(care_plan), None) => Ok(SplitSections {
            summary: summary.replacen(STRICT_SUMMARY_LABEL, "", 1).trim().to_string(),
            care_plan: care_plan.trim().to_string(),
        }),
        _ => Err(SplitError::InvalidFormat),
    }
}
