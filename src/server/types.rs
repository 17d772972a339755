//! Wire types and error responses for the HTTP layer.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::FieldError;
use crate::summary::SummaryError;

const GENERATION_FAILED: &str = "Failed to generate summary. Please check your notes and try again.";

/// JSON error body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// `completion` or `response_format` for generation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// Error returned from a handler, carrying its status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                details: None,
                kind: None,
                errors: Vec::new(),
            },
        }
    }

    /// Validation failure with field-level detail
    pub fn invalid(errors: Vec<FieldError>) -> Self {
        let mut err = Self::new(StatusCode::BAD_REQUEST, "Invalid request data");
        err.body.errors = errors;
        err
    }

    /// Unreadable JSON on a summary endpoint
    pub fn from_rejection(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
        Self::invalid(vec![FieldError {
            field: "body".to_string(),
            message: rejection.body_text(),
        }])
    }

    pub fn internal(error: impl Into<String>, details: impl Into<String>) -> Self {
        let mut err = Self::new(StatusCode::INTERNAL_SERVER_ERROR, error);
        err.body.details = Some(details.into());
        err
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }
}

impl From<SummaryError> for ApiError {
    fn from(err: SummaryError) -> Self {
        match err {
            SummaryError::Validation(v) => Self::invalid(v.errors),
            SummaryError::Completion(e) => {
                let mut api = Self::internal(GENERATION_FAILED, e.to_string());
                api.body.kind = Some("completion");
                api
            }
            SummaryError::ResponseFormat(e) => {
                let mut api = Self::internal(GENERATION_FAILED, e.to_string());
                api.body.kind = Some("response_format");
                api
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Acknowledgement for `POST /api/feedback`
#[derive(Debug, Serialize)]
pub struct FeedbackAck {
    pub success: bool,
    pub message: &'static str,
}

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub model: String,
    pub timestamp: String,
}
