//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `http` - HTTP API server and request router
//! - `error` - HTTP error responses
//! - `journal` - Store mutations to file (JSONL format)
//! - `prometheus` - Prometheus text exposition for /metrics

pub mod error;
pub mod http;
pub mod journal;
pub mod prometheus;

// Re-export commonly used types
pub use error::ApiError;
pub use http::{dispatch, start_api_server, ApiRequest, AppState};
pub use journal::{read_entries, Journal, JournalEntry};
