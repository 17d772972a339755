//! Summary generation: validate, build the prompt, call the completion
//! service once, split the reply.

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::completion::{CompletionError, CompletionRequest, CompletionService, DEFAULT_MODEL};
use crate::models::{
    LegacySummaryRequestBody, SummaryRequestBody, SummaryResponse, ValidationErrors,
    CARE_PLAN_PLACEHOLDER, DEFAULT_MIN_NOTES_LENGTH,
};
use crate::prompt::{build_legacy_prompt, build_prompt, PromptPair};
use crate::splitter::{split_response, SplitError, SplitMode};

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    ResponseFormat(#[from] SplitError),
}

/// Model parameters for both generation paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
    pub legacy_max_tokens: u32,
    pub min_notes_length: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            legacy_max_tokens: 2048,
            min_notes_length: DEFAULT_MIN_NOTES_LENGTH,
        }
    }
}

/// Stateless summary generator around an injected completion service
pub struct SummaryService {
    completion: Arc<dyn CompletionService>,
    settings: GenerationSettings,
}

impl SummaryService {
    pub fn new(completion: Arc<dyn CompletionService>, settings: GenerationSettings) -> Self {
        Self {
            completion,
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Primary path: lenient splitting, placeholder care plan when none found
    pub async fn summarize(&self, body: &SummaryRequestBody) -> Result<SummaryResponse, SummaryError> {
        let request_id = Uuid::new_v4();
        let request = body.validate(self.settings.min_notes_length).map_err(|e| {
            warn!(%request_id, "Rejected summary request: {:?}", e.errors);
            e
        })?;

        info!(
            %request_id,
            tone = request.tone.as_str(),
            output_format = request.output_format.as_str(),
            has_date = request.session_date.is_some(),
            "Generating summary for notes of {} chars",
            request.session_notes.len()
        );

        let prompt = build_prompt(&request);
        let reply = self
            .complete(request_id, prompt, self.settings.max_tokens)
            .await?;

        let sections = split_response(&reply, SplitMode::Lenient)?;
        let care_plan = if sections.care_plan.is_empty() {
            warn!(%request_id, "No care plan section found in reply, using placeholder");
            CARE_PLAN_PLACEHOLDER.to_string()
        } else {
            sections.care_plan
        };

        info!(
            %request_id,
            "Summary generated (summary {} chars, care plan {} chars)",
            sections.summary.len(),
            care_plan.len()
        );

        Ok(SummaryResponse {
            summary: sections.summary,
            care_plan,
        })
    }

    /// Legacy path: strict marker splitting, malformed replies are errors
    pub async fn summarize_legacy(
        &self,
        body: &LegacySummaryRequestBody,
    ) -> Result<SummaryResponse, SummaryError> {
        let request_id = Uuid::new_v4();
        let request = body.validate(self.settings.min_notes_length).map_err(|e| {
            warn!(%request_id, "Rejected legacy summary request: {:?}", e.errors);
            e
        })?;

        info!(
            %request_id,
            tone = request.tone.as_str(),
            "Generating legacy summary for notes of {} chars",
            request.notes.len()
        );

        let prompt = build_legacy_prompt(&request);
        let reply = self
            .complete(request_id, prompt, self.settings.legacy_max_tokens)
            .await?;

        let sections = split_response(&reply, SplitMode::Strict).map_err(|e| {
            error!(%request_id, "Reply did not match the strict layout: {}", e);
            e
        })?;

        Ok(SummaryResponse {
            summary: sections.summary,
            care_plan: sections.care_plan,
        })
    }

    async fn complete(
        &self,
        request_id: Uuid,
        prompt: PromptPair,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            system: prompt.system,
            prompt: prompt.user,
            model: self.settings.model.clone(),
            max_tokens,
        };

        self.completion.complete(request).await.map_err(|e| {
            error!(%request_id, "Completion failed: {}", e);
            e
        })
    }
}
