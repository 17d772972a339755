//! Prompt construction for summary generation.
//!
//! Pure string building: the notes are embedded verbatim, with no truncation
//! or redaction.

use crate::models::{LegacySummaryRequest, OutputFormat, SummaryRequest, Tone};

/// System instruction and user prompt sent to the completion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

const ROLE_PREAMBLE: &str = "You are an AI assistant specialized in helping mental health professionals create professional documentation. Your task is to transform rough therapy session notes into structured, professional summaries and care plans.";

const CONFIDENTIALITY_DIRECTIVE: &str = "Always maintain client confidentiality and use professional therapeutic language. Structure your response with clear sections for session summary and care plan.";

const OUTPUT_REQUEST: &str = "Please provide:
1. **Session Summary**: A professional summary of the session including key observations, client presentation, and therapeutic interventions used.
2. **Care Plan**: Specific, actionable next steps for continued treatment including recommendations for future sessions, homework/between-session tasks, and any referrals or additional resources needed.";

/// Tone instruction fragment (the tone profile table)
pub fn tone_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Formal => "Use professional but accessible language suitable for clinical documentation. Balance formality with readability while maintaining therapeutic professionalism.",
        Tone::Clinical => "Use professional clinical language appropriate for medical documentation. Include relevant therapeutic terminology and maintain a formal, objective tone suitable for healthcare settings.",
        Tone::Conversational => "Use natural, easy-to-read language while maintaining professionalism. Make the content approachable but still appropriate for therapeutic documentation.",
    }
}

/// Shorter tone fragments used by the legacy single-prompt path
pub fn legacy_tone_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Formal => "Use professional but accessible language suitable for clinical documentation.",
        Tone::Clinical => "Use professional medical terminology and clinical language appropriate for healthcare settings.",
        Tone::Conversational => "Use natural, easy-to-read language while maintaining professionalism.",
    }
}

pub fn format_instruction(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Bullet => "Format the output using bullet points and lists where appropriate.",
        OutputFormat::Paragraph => "Format the output in well-structured paragraphs.",
    }
}

/// Build the prompt pair for the primary summary endpoint
pub fn build_prompt(request: &SummaryRequest) -> PromptPair {
    let system = format!(
        "{}\n\n{}\n\n{}\n\n{}",
        ROLE_PREAMBLE,
        tone_instruction(request.tone),
        format_instruction(request.output_format),
        CONFIDENTIALITY_DIRECTIVE
    );

    let mut user = format!(
        "Please convert these therapy session notes into a professional format:\n\n{}\n\n{}",
        request.session_notes, OUTPUT_REQUEST
    );

    if let Some(date) = &request.session_date {
        user.push_str(&format!("\n\nSession Date: {}", date));
    }

    user.push_str("\n\nInclude a section for therapist comments at the end.");

    PromptPair { system, user }
}

/// Build the single user prompt for the legacy endpoint.
///
/// The reply skeleton must contain the literal `CARE PLAN & NEXT STEPS:`
/// marker the strict splitter looks for.
pub fn build_legacy_prompt(request: &LegacySummaryRequest) -> PromptPair {
    let user = format!(
        r#"You are a helpful mental health assistant. Based on the therapist's notes below, generate:
1. A clear, concise session summary (2-3 paragraphs)
2. A brief care plan with next steps for the next session

{tone}

Important guidelines:
- Only use the information provided in the notes
- Do not add assumptions or information not present in the notes
- Structure the summary professionally
- Include specific action items and goals for the care plan
- Maintain client confidentiality (avoid specific personal details)

Therapist Notes:
{notes}

Please provide your response in the following format:

SESSION SUMMARY:
[Your session summary here]

{marker}
[Your care plan here]"#,
        tone = legacy_tone_instruction(request.tone),
        notes = request.notes,
        marker = crate::splitter::STRICT_MARKER,
    );

    PromptPair {
        system: String::new(),
        user,
    }
}
