/// Configuration schema and defaults for strm-console.
///
/// Defines the TOML-serializable configuration structure with the
/// `[server]`, `[web]` and `[logging]` sections. Every field has a built-in
/// default; users only set the values they want to override.
use serde::{Deserialize, Serialize};

/// Default backend origin.
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Default base path for all authenticated endpoints.
const DEFAULT_API_BASE: &str = "/api";

/// Client-wide request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default listen address for `strm-console serve`.
const DEFAULT_WEB_ADDR: &str = "127.0.0.1:9747";

/// Default page size, shared with the client's `list_tasks` default.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level strm-console configuration.
///
/// Maps directly to `~/.strm-console/config.toml` and `.strm-console.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server: ServerConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Where the STRM backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend origin, e.g. `http://nas.local:8080`. The health check is
    /// issued against this origin directly.
    pub url: String,
    /// Path prefix for every authenticated endpoint.
    pub api_base: String,
    /// Request timeout applied uniformly to every call.
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Settings for the local view server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub addr: String,
    pub page_size: u32,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_WEB_ADDR.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append failed API calls to `~/.strm-console/api-errors.jsonl`.
    pub error_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { error_log: true }
    }
}

impl ConsoleConfig {
    /// Annotated default config written by `strm-console config init`.
    pub fn default_toml() -> &'static str {
        r#"# strm-console configuration
#
# Precedence: defaults < ~/.strm-console/config.toml < .strm-console.toml < STRM_* env vars

[server]
# Backend origin. /health is requested here, everything else under api_base.
url = "http://127.0.0.1:8080"
api_base = "/api"
timeout_ms = 30000

[web]
addr = "127.0.0.1:9747"
page_size = 20

[logging]
# Append failed API calls to ~/.strm-console/api-errors.jsonl
error_log = true
"#
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_conventions() {
        let cfg = ConsoleConfig::default();
        assert_eq!(cfg.server.url, "http://127.0.0.1:8080");
        assert_eq!(cfg.server.api_base, "/api");
        assert_eq!(cfg.server.timeout_ms, 30_000);
        assert_eq!(cfg.web.page_size, 20);
        assert!(cfg.logging.error_log);
    }

    #[test]
    fn default_toml_parses_to_defaults() {
        let parsed: ConsoleConfig = toml::from_str(ConsoleConfig::default_toml()).unwrap();
        assert_eq!(parsed, ConsoleConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let parsed: ConsoleConfig = toml::from_str(
            r#"
[server]
url = "http://nas:8080"
"#,
        )
        .unwrap();
        assert_eq!(parsed.server.url, "http://nas:8080");
        assert_eq!(parsed.server.api_base, "/api");
        assert_eq!(parsed.web, WebConfig::default());
    }
}
