//! Session scribe: turns therapy session notes into a professional session
//! summary and care plan via a language-model completion service.

pub mod completion;
pub mod config;
pub mod formatting;
pub mod models;
pub mod prompt;
pub mod server;
pub mod splitter;
pub mod summary;
