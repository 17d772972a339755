//! Router construction and the listener loop.

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::summary::SummaryService;

use super::handlers;

/// Shared state for the HTTP server
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SummaryService>,
}

/// Build the router with CORS, tracing and a request body cap.
///
/// `max_body_bytes` also replaces axum's default 2 MiB extractor limit, so
/// the configured cap holds in both directions.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/api/summary",
            post(handlers::summary).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/generate-summary",
            post(handlers::legacy_summary).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/feedback",
            post(handlers::feedback).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/export",
            post(handlers::export).fallback(handlers::method_not_allowed),
        )
        .route(
            "/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
}

/// Serve `app` on `addr` until Ctrl-C
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Session scribe listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
