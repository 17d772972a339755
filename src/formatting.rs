//! Display and export helpers for generated documentation.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::splitter::STRICT_MARKER;

/// Marker placed before each bullet line
pub const BULLET: &str = "•";

const COMMENT_RULE: &str = "_________________________";

fn sentence_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.\s+").expect("sentence boundary pattern is valid"))
}

/// One list marker followed by whitespace or alone. `-2` and `**bold**` are
/// content.
fn bullet_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[•*-](?:\s+|$)").expect("bullet prefix pattern is valid"))
}

/// Rewrite a block of text as one bullet per sentence.
///
/// Sentences are split on a period followed by whitespace, so abbreviations
/// such as "Dr. Smith" break a sentence in two and nested lists flatten.
/// An existing leading bullet (`•`, `-` or `*` followed by whitespace) is
/// replaced rather than doubled, which keeps re-application stable for plain
/// sentences.
pub fn to_bullet_points(text: &str) -> String {
    sentence_boundary()
        .split(text)
        .map(|fragment| {
            let fragment = fragment.trim();
            match bullet_prefix().find(fragment) {
                Some(m) => fragment[m.end()..].trim(),
                None => fragment,
            }
        })
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| {
            if fragment.ends_with('.') {
                format!("{} {}", BULLET, fragment)
            } else {
                format!("{} {}.", BULLET, fragment)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain-text export document (also what "copy all" places on the clipboard)
pub fn format_export_content(summary: &str, care_plan: &str, session_date: Option<&str>) -> String {
    let date = session_date
        .filter(|d| !d.trim().is_empty())
        .map(|d| format!("Session Date: {}\n\n", d))
        .unwrap_or_default();

    format!(
        "{date}SESSION SUMMARY:\n{summary}\n\n{STRICT_MARKER}\n{care_plan}\n\nTherapist Comments:\n{COMMENT_RULE}\n{COMMENT_RULE}\n{COMMENT_RULE}"
    )
}

/// File name for a text export. Characters that are unsafe in file names or
/// in a header value (control characters) are replaced with `-`; without a
/// session date `today` is used.
pub fn export_filename(session_date: Option<&str>, today: NaiveDate) -> String {
    let stem = match session_date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(date) => date
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
                c if c.is_control() => '-',
                other => other,
            })
            .collect(),
        None => today.format("%Y-%m-%d").to_string(),
    };
    format!("session-summary-{}.txt", stem)
}
