//! Typed bodies exchanged with the STRM backend.
//!
//! Response types default every missing field and ignore unknown ones, so a
//! backend that adds or drops a field still decodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body for `POST /generate`.
///
/// An empty `path` runs every enabled mapping; otherwise it names one
/// mapping. `mode` is forwarded as-is (`incremental` or `full`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateResponse {
    pub task_id: String,
    pub status: String,
}

/// One STRM generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub task_id: String,
    pub config_name: String,
    pub mode: String,
    /// `running`, `completed` or `failed`.
    pub status: String,
    pub files_created: u64,
    pub files_deleted: u64,
    pub files_skipped: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Body of `GET /tasks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPage {
    #[serde(deserialize_with = "null_as_empty")]
    pub tasks: Vec<Task>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl TaskPage {
    /// Number of pages needed for `total` at this page size.
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }
}

/// A source → target path mapping ("config").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mapping {
    pub id: u64,
    pub name: String,
    pub source: String,
    pub target: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub extensions: Vec<String>,
    pub concurrent: u32,
    pub mode: String,
    /// `alist_path` or `http_url`.
    pub strm_mode: String,
    pub cron_expr: String,
    pub enabled: bool,
}

/// Body of `GET /configs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigList {
    #[serde(deserialize_with = "null_as_empty")]
    pub configs: Vec<Mapping>,
}

/// Body of `DELETE /configs/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteResponse {
    pub message: String,
}

/// Body of `GET /status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub version: String,
    /// Seconds since the backend started.
    pub uptime: i64,
    pub start_time: DateTime<Utc>,
}

/// Body of `GET /health`. The client hands back the raw response for the
/// health check; decode with this when the body is wanted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthBody {
    pub status: String,
    pub version: String,
}

/// Go encodes empty slices as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
