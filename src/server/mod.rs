//! HTTP server for session summary generation.
//!
//! ## Routes
//!
//! - `POST /api/summary` - Summary and care plan from session notes
//! - `POST /api/generate-summary` - Older request shape, strict reply layout
//! - `POST /api/feedback` - Logs user feedback
//! - `POST /api/export` - Plain-text export document as a download
//! - `GET /health` - Liveness check
//!
//! Every route answers `OPTIONS` through the CORS layer and any other
//! method with `405`.
//!
//! ## Usage
//!
//! ```ignore
//! let completion = Arc::new(AnthropicClient::new(url, key, connect, timeout)?);
//! let service = Arc::new(SummaryService::new(completion, settings));
//! let app = server::build_router(AppState { service }, config.max_body_bytes);
//! server::serve(addr, app).await?;
//! ```
//!
//! ## Protocol
//!
//! ```json
//! {
//!     "sessionNotes": "Client reported ...",
//!     "tone": "clinical",
//!     "outputFormat": "bullet",
//!     "sessionDate": "2024-05-02"
//! }
//! ```

mod handlers;
mod router;
mod types;

pub use router::{build_router, serve, AppState};
pub use types::{ApiError, ErrorBody};
