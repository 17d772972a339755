//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{error, info};
use uuid::Uuid;

use crate::formatting::{export_filename, format_export_content, to_bullet_points};
use crate::models::{
    ExportRequest, FeedbackRequest, LegacySummaryRequestBody, OutputFormat, SummaryRequestBody,
    SummaryResponse,
};

use super::router::AppState;
use super::types::{ApiError, FeedbackAck, HealthResponse};

// ============================================================================
// Summary
// ============================================================================

pub async fn summary(
    State(state): State<AppState>,
    body: Result<Json<SummaryRequestBody>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Json(body) = body.map_err(ApiError::from_rejection)?;
    Ok(Json(state.service.summarize(&body).await?))
}

pub async fn legacy_summary(
    State(state): State<AppState>,
    body: Result<Json<LegacySummaryRequestBody>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Json(body) = body.map_err(ApiError::from_rejection)?;
    Ok(Json(state.service.summarize_legacy(&body).await?))
}

// ============================================================================
// Feedback
// ============================================================================

pub async fn feedback(
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<FeedbackAck>, ApiError> {
    let Json(req) = body.map_err(|e| {
        error!("Error processing feedback: {}", e.body_text());
        ApiError::internal("Failed to process feedback", e.body_text())
    })?;

    let metadata = serde_json::to_string_pretty(&req.metadata).unwrap_or_else(|_| "null".to_string());
    info!(
        feedback_id = %Uuid::new_v4(),
        kind = req.kind.as_deref().unwrap_or("unspecified"),
        timestamp = %chrono::Utc::now().to_rfc3339(),
        "User feedback received: {}\nmetadata: {}",
        req.feedback.as_deref().unwrap_or(""),
        metadata
    );

    Ok(Json(FeedbackAck {
        success: true,
        message: "Feedback received and logged",
    }))
}

// ============================================================================
// Export
// ============================================================================

pub async fn export(
    body: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(ApiError::from_rejection)?;

    let (summary, care_plan) = match req.output_format {
        OutputFormat::Bullet => (to_bullet_points(&req.summary), to_bullet_points(&req.care_plan)),
        OutputFormat::Paragraph => (req.summary, req.care_plan),
    };

    let session_date = req.session_date.as_deref();
    let content = format_export_content(&summary, &care_plan, session_date);
    let filename = export_filename(session_date, chrono::Local::now().date_naive());
    info!("Exporting {} ({} chars)", filename, content.len());

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        content,
    ))
}

// ============================================================================
// Misc
// ============================================================================

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        model: state.service.settings().model.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}
