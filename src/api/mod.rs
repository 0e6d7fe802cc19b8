/// HTTP client for the STRM backend.
///
/// Wraps a configured synchronous `ureq` agent with:
///
/// - **Base path**: every operation except [`ApiClient::health`] is issued
///   under `{server}{api_base}` (default `/api`).
/// - **Credential**: the token given at construction is sent as
///   `X-API-Token` on every call through the configured agent. No token, no
///   header.
/// - **Decoding**: 2xx bodies are decoded into the operation's return type;
///   callers never see the response envelope.
/// - **Failures**: non-2xx, transport errors, timeouts and undecodable
///   bodies are reported once to the [`DiagnosticSink`] and returned to the
///   caller unchanged. Nothing is retried.
///
/// The health check is deliberately outside all of this: it hits `/health`
/// on the server origin with a bare request, unauthenticated, and returns
/// the raw response.
pub mod models;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ConsoleConfig;
use crate::config::schema::{DEFAULT_PAGE_SIZE, ServerConfig};
use crate::diagnostics::{ApiErrorEntry, ConsoleSink, DiagnosticSink};
use crate::storage::LocalStorage;

pub use models::{
    ConfigList, DeleteResponse, GenerateRequest, GenerateResponse, HealthBody, Mapping, Status,
    Task, TaskPage,
};

/// Header carrying the credential.
pub const TOKEN_HEADER: &str = "X-API-Token";

/// Timeout for the unauthenticated health check only. Deliberately shorter
/// than `server.timeout_ms` so a dead backend is reported quickly; every
/// other endpoint uses the configured agent timeout.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Page requested by [`ApiClient::list_tasks`] when none is given.
pub const DEFAULT_PAGE: u32 = 1;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking client for the STRM backend. Cheap to share across threads.
#[derive(Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
    origin: String,
    api_base: String,
    token: Option<String>,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("origin", &self.origin)
            .field("api_base", &self.api_base)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Build a client for `server` with an explicit credential.
    ///
    /// An empty token is treated as no token. Failures are reported to
    /// stderr until [`with_sink`](Self::with_sink) replaces the sink.
    pub fn new(server: &ServerConfig, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(server.timeout_ms))
            .build();

        Self {
            agent,
            origin: server.url.trim_end_matches('/').to_string(),
            api_base: normalize_base(&server.api_base),
            token: token.filter(|t| !t.is_empty()),
            sink: Arc::new(ConsoleSink::new(false)),
        }
    }

    /// Build a client from the resolved config, reading the credential from
    /// local storage once.
    pub fn from_config(config: &ConsoleConfig, storage: &LocalStorage) -> Self {
        Self::new(&config.server, storage.api_token())
            .with_sink(Arc::new(ConsoleSink::new(config.logging.error_log)))
    }

    /// Replace the diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    /// `GET /health` on the server origin. Unauthenticated, not decoded.
    pub fn health(&self) -> Result<ureq::Response> {
        let url = format!("{}/health", self.origin);
        let response = ureq::get(&url).timeout(HEALTH_TIMEOUT).call()?;
        Ok(response)
    }

    /// `POST /generate` — start a STRM generation run.
    pub fn generate<P: Serialize + ?Sized>(&self, payload: &P) -> Result<GenerateResponse> {
        self.send("POST", "/generate", &[], Some(payload))
    }

    /// `GET /tasks/{id}`.
    pub fn get_task(&self, task_id: &str) -> Result<Task> {
        self.send::<Task, ()>("GET", &format!("/tasks/{task_id}"), &[], None)
    }

    /// `GET /tasks?page=&page_size=`. Missing values default to page 1 of
    /// 20.
    pub fn list_tasks(&self, page: Option<u32>, page_size: Option<u32>) -> Result<TaskPage> {
        let query = [
            ("page", page.unwrap_or(DEFAULT_PAGE).to_string()),
            (
                "page_size",
                page_size.unwrap_or(DEFAULT_PAGE_SIZE).to_string(),
            ),
        ];
        self.send::<TaskPage, ()>("GET", "/tasks", &query, None)
    }

    /// `GET /configs`.
    pub fn get_configs(&self) -> Result<ConfigList> {
        self.send::<ConfigList, ()>("GET", "/configs", &[], None)
    }

    /// `POST /configs`.
    pub fn create_config<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Mapping> {
        self.send("POST", "/configs", &[], Some(payload))
    }

    /// `PUT /configs/{id}`.
    pub fn update_config<P: Serialize + ?Sized>(
        &self,
        id: impl fmt::Display,
        payload: &P,
    ) -> Result<Mapping> {
        self.send("PUT", &format!("/configs/{id}"), &[], Some(payload))
    }

    /// `DELETE /configs/{id}`.
    pub fn delete_config(&self, id: impl fmt::Display) -> Result<DeleteResponse> {
        self.send::<DeleteResponse, ()>("DELETE", &format!("/configs/{id}"), &[], None)
    }

    /// `GET /status`.
    pub fn get_status(&self) -> Result<Status> {
        self.send::<Status, ()>("GET", "/status", &[], None)
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.origin, self.api_base, path)
    }

    /// Full request URL, query string included, as sent and as reported.
    fn request_url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = self.api_url(path);
        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        url
    }

    /// Issue one request through the configured agent and decode the body.
    ///
    /// Every failure path goes through the single `report` call below.
    fn send<T, P>(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, String)],
        payload: Option<&P>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let url = self.request_url(path, query);
        let result = self.execute(method, &url, payload);

        if let Err(ref err) = result {
            self.report(method, &url, err);
        }
        result
    }

    fn execute<T, P>(
        &self,
        method: &str,
        url: &str,
        payload: Option<&P>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let mut request = self.agent.request(method, url);
        if let Some(token) = &self.token {
            request = request.set(TOKEN_HEADER, token);
        }

        let response = match payload {
            Some(body) => {
                let body = serde_json::to_value(body).context("failed to serialize request body")?;
                request.send_json(body)?
            }
            None => request.call()?,
        };

        response
            .into_json::<T>()
            .with_context(|| format!("failed to decode response from {method} {url}"))
    }

    fn report(&self, method: &str, url: &str, err: &anyhow::Error) {
        let status = match err.downcast_ref::<ureq::Error>() {
            Some(ureq::Error::Status(code, _)) => Some(*code),
            _ => None,
        };
        self.sink
            .api_error(&ApiErrorEntry::new(method, url, status, &format!("{err:#}")));
    }
}

/// Ensure the base path starts with `/` and has no trailing `/`. An empty
/// base means endpoints live at the origin root.
fn normalize_base(base: &str) -> String {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
