use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use session_scribe::completion::{CompletionError, CompletionRequest, CompletionService};
use session_scribe::models::CARE_PLAN_PLACEHOLDER;
use session_scribe::server::{build_router, AppState};
use session_scribe::summary::{GenerationSettings, SummaryService};

/// Completion stub returning a canned reply and counting calls
struct CannedCompletion {
    reply: Option<String>,
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionService for CannedCompletion {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(CompletionError::Status {
                status: 401,
                body: "invalid x-api-key".to_string(),
            }),
        }
    }
}

fn app(reply: Option<&str>) -> (Router, Arc<CannedCompletion>) {
    app_with_limit(reply, 64 * 1024)
}

fn app_with_limit(reply: Option<&str>, max_body_bytes: usize) -> (Router, Arc<CannedCompletion>) {
    let completion = Arc::new(CannedCompletion {
        reply: reply.map(str::to_string),
        calls: AtomicUsize::new(0),
    });
    let service = Arc::new(SummaryService::new(
        completion.clone(),
        GenerationSettings::default(),
    ));
    (build_router(AppState { service }, max_body_bytes), completion)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn read_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_summary_success() {
    let (app, completion) = app(Some(
        "1. **Session Summary**: Client engaged and reflective.\n\n2. **Care Plan**: Practice grounding daily.",
    ));
    let response = app
        .oneshot(post_json(
            "/api/summary",
            json!({
                "sessionNotes": "Client engaged, discussed anxiety triggers.",
                "tone": "clinical",
                "outputFormat": "bullet",
                "sessionDate": "2024-05-02"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["summary"], "Client engaged and reflective.");
    assert_eq!(body["carePlan"], "Practice grounding daily.");
    assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_summary_placeholder_care_plan() {
    let (app, _) = app(Some("Just one blob of text."));
    let response = app
        .oneshot(post_json(
            "/api/summary",
            json!({ "sessionNotes": "Client engaged, discussed anxiety triggers.", "tone": "formal" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["summary"], "Just one blob of text.");
    assert_eq!(body["carePlan"], CARE_PLAN_PLACEHOLDER);
}

#[tokio::test]
async fn test_summary_validation_error_skips_completion() {
    let (app, completion) = app(Some("unused"));
    let response = app
        .oneshot(post_json(
            "/api/summary",
            json!({ "sessionNotes": "short", "tone": "whimsical" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Invalid request data");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["sessionNotes", "tone"]);
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_summary_malformed_json() {
    let (app, completion) = app(Some("unused"));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/summary")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_summary_completion_failure() {
    let (app, _) = app(None);
    let response = app
        .oneshot(post_json(
            "/api/summary",
            json!({ "sessionNotes": "Client engaged, discussed anxiety triggers.", "tone": "formal" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(
        body["error"],
        "Failed to generate summary. Please check your notes and try again."
    );
    assert_eq!(body["kind"], "completion");
    assert!(body["details"].as_str().unwrap().contains("401"));
}

#[tokio::test]
async fn test_legacy_summary_strict_success() {
    let (app, _) = app(Some("SESSION SUMMARY:\nA\n\nCARE PLAN & NEXT STEPS:\nB"));
    let response = app
        .oneshot(post_json(
            "/api/generate-summary",
            json!({ "notes": "Client reports better sleep.", "tone": "conversational" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body, json!({ "summary": "A", "carePlan": "B" }));
}

#[tokio::test]
async fn test_legacy_summary_missing_marker() {
    let (app, completion) = app(Some("**Session Summary** A **Care Plan** B"));
    let response = app
        .oneshot(post_json(
            "/api/generate-summary",
            json!({ "notes": "Client reports better sleep.", "tone": "formal" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["details"], "Invalid response format from Claude API");
    assert_eq!(body["kind"], "response_format");
    assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (app, _) = app(Some("unused"));
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/summary")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn test_options_preflight() {
    let (app, completion) = app(Some("unused"));
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/feedback")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .contains("POST"));
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cors_header_on_post() {
    let (app, _) = app(Some("Summary only."));
    let mut request = post_json(
        "/api/summary",
        json!({ "sessionNotes": "Client engaged, discussed anxiety triggers.", "tone": "formal" }),
    );
    request
        .headers_mut()
        .insert(header::ORIGIN, "https://example.com".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_feedback_always_ok() {
    let (app, completion) = app(Some("unused"));
    let response = app
        .oneshot(post_json(
            "/api/feedback",
            json!({
                "type": "suggestion",
                "feedback": "Please add PDF export",
                "metadata": { "tone": "formal", "notesLength": 120 }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_feedback_unreadable_body() {
    let (app, _) = app(Some("unused"));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/feedback")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("[1, 2"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Failed to process feedback");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_export_bullet_document() {
    let (app, _) = app(Some("unused"));
    let response = app
        .oneshot(post_json(
            "/api/export",
            json!({
                "summary": "Client attended. Mood stable.",
                "carePlan": "Continue journaling",
                "sessionDate": "05/02/2024",
                "outputFormat": "bullet"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"session-summary-05-02-2024.txt\""
    );
    let text = read_text(response).await;
    assert!(text.starts_with("Session Date: 05/02/2024\n\nSESSION SUMMARY:\n• Client attended.\n• Mood stable."));
    assert!(text.contains("CARE PLAN & NEXT STEPS:\n• Continue journaling."));
    assert!(text.contains("Therapist Comments:"));
}

#[tokio::test]
async fn test_export_filename_control_characters() {
    let (app, _) = app(Some("unused"));
    let response = app
        .oneshot(post_json(
            "/api/export",
            json!({
                "summary": "Client attended.",
                "carePlan": "Continue journaling.",
                "sessionDate": "2024-05-02\nfollow-up"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"session-summary-2024-05-02-follow-up.txt\""
    );
    let text = read_text(response).await;
    assert!(text.contains("SESSION SUMMARY:\nClient attended."));
}

#[tokio::test]
async fn test_body_over_limit() {
    let (app, completion) = app(Some("unused"));
    let response = app
        .oneshot(post_json(
            "/api/summary",
            json!({ "sessionNotes": "a".repeat(100_000), "tone": "formal" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Request body too large");
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_body_limit_above_axum_default() {
    let (app, _) = app_with_limit(Some("unused"), 4 * 1024 * 1024);
    let response = app
        .oneshot(post_json(
            "/api/feedback",
            json!({ "type": "bug", "feedback": "x".repeat(3 * 1024 * 1024) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(Some("unused"));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["healthy"], true);
    assert_eq!(body["model"], GenerationSettings::default().model);
}
