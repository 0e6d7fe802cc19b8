//! Diagnostic channel for failed API calls.
//!
//! The API client reports every failure to a [`DiagnosticSink`] exactly once
//! before handing the error back to its caller. The default sink is
//! [`ConsoleSink`], which prints to stderr and appends a JSONL record to
//! `~/.strm-console/api-errors.jsonl`.

pub mod logger;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

pub use logger::ConsoleSink;

/// One failed API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorEntry {
    pub timestamp: String,
    pub method: String,
    pub url: String,
    /// HTTP status for application failures; `None` for transport errors.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    pub error: String,
}

impl ApiErrorEntry {
    pub fn new(method: &str, url: &str, status: Option<u16>, error: &str) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            method: method.to_string(),
            url: url.to_string(),
            status,
            error: error.to_string(),
        }
    }
}

/// Receives one entry per failed API call.
pub trait DiagnosticSink: Send + Sync {
    fn api_error(&self, entry: &ApiErrorEntry);
}

/// Sink that keeps entries in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<ApiErrorEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ApiErrorEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink {
    fn api_error(&self, entry: &ApiErrorEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}
