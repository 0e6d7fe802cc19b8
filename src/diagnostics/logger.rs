use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{ApiErrorEntry, DiagnosticSink};

// ---------------------------------------------------------------------------
// Console sink
// ---------------------------------------------------------------------------

/// Default sink: `API Error: ...` on stderr, plus an optional JSONL record.
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    log_path: Option<PathBuf>,
}

impl ConsoleSink {
    /// Build the sink from config. When `error_log` is off, only stderr is
    /// written.
    pub fn new(error_log: bool) -> Self {
        Self {
            log_path: if error_log { error_log_path() } else { None },
        }
    }

    /// Sink that appends to an explicit file.
    pub fn with_log_file(path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: Some(path.into()),
        }
    }
}

impl DiagnosticSink for ConsoleSink {
    fn api_error(&self, entry: &ApiErrorEntry) {
        match entry.status {
            Some(status) => eprintln!(
                "API Error: {} {} -> {}: {}",
                entry.method, entry.url, status, entry.error
            ),
            None => eprintln!("API Error: {} {}: {}", entry.method, entry.url, entry.error),
        }

        // Logging never turns into a second failure for the caller.
        if let Some(path) = &self.log_path {
            let _ = append_entry(path, entry);
        }
    }
}

// ---------------------------------------------------------------------------
// JSONL file
// ---------------------------------------------------------------------------

fn append_entry(path: &Path, entry: &ApiErrorEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Read every entry from a JSONL error log, skipping malformed lines.
pub fn read_entries(path: &Path) -> Vec<ApiErrorEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| serde_json::from_str::<ApiErrorEntry>(&line).ok())
        .collect()
}

/// Return the path to the API error log.
pub fn error_log_path() -> Option<PathBuf> {
    crate::config::state_dir().map(|dir| dir.join("api-errors.jsonl"))
}
