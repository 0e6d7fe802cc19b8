/// Integration tests for the API client against a fake backend.
///
/// Each test starts its own `tiny_http` server on an ephemeral port, so the
/// tests are independent and need no network access.
mod common;

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::FakeBackend;
use serde_json::json;
use strm_console::api::{ApiClient, GenerateRequest, HealthBody, TOKEN_HEADER};
use strm_console::config::schema::ServerConfig;
use strm_console::diagnostics::MemorySink;

const TASK_JSON: &str = r#"{
    "task_id": "abc",
    "config_name": "movies",
    "mode": "incremental",
    "status": "running",
    "files_created": 3,
    "files_deleted": 0,
    "files_skipped": 9,
    "started_at": "2024-05-01T10:00:00Z"
}"#;

fn with_memory_sink(client: ApiClient) -> (ApiClient, MemorySink) {
    let sink = MemorySink::new();
    (client.with_sink(Arc::new(sink.clone())), sink)
}

// ---------------------------------------------------------------------------
// Credential header
// ---------------------------------------------------------------------------

#[test]
fn token_is_sent_when_present() {
    let backend = FakeBackend::fixed(1, 200, r#"{"configs": []}"#);
    let client = backend.client(Some("s3cret"));

    client.get_configs().unwrap();

    let req = backend.next_request();
    assert_eq!(req.header(TOKEN_HEADER), Some("s3cret"));
}

#[test]
fn token_is_omitted_when_absent() {
    let backend = FakeBackend::fixed(1, 200, r#"{"configs": []}"#);
    let client = backend.client(None);

    client.get_configs().unwrap();

    let req = backend.next_request();
    assert_eq!(req.header(TOKEN_HEADER), None);
}

#[test]
fn token_is_sent_on_every_configured_call() {
    let backend = FakeBackend::start(7, |req| {
        let body = if req.url.starts_with("/api/status") {
            r#"{"version":"1.0.0","uptime":5,"start_time":"2024-05-01T10:00:00Z"}"#
        } else if req.url.starts_with("/api/generate") {
            r#"{"task_id":"t1","status":"running"}"#
        } else if req.url.starts_with("/api/tasks/") {
            TASK_JSON
        } else if req.url.starts_with("/api/configs") && req.method == "DELETE" {
            r#"{"message":"mapping deleted successfully"}"#
        } else if req.url.starts_with("/api/configs") {
            r#"{"id":2,"name":"tv","source":"/alist/tv","target":"/strm/tv","enabled":true}"#
        } else {
            r#"{"tasks":[],"total":0,"page":1,"page_size":20}"#
        };
        (200, body.to_string())
    });
    let client = backend.client(Some("tok"));
    let mapping = json!({ "name": "tv", "source": "/alist/tv", "target": "/strm/tv" });

    client.get_status().unwrap();
    client.generate(&GenerateRequest::default()).unwrap();
    client.get_task("abc").unwrap();
    client.list_tasks(None, None).unwrap();
    client.create_config(&mapping).unwrap();
    client.update_config(2, &mapping).unwrap();
    client.delete_config(1).unwrap();

    let seen: Vec<(String, String)> = (0..7)
        .map(|_| {
            let req = backend.next_request();
            assert_eq!(req.header(TOKEN_HEADER), Some("tok"), "{} {}", req.method, req.url);
            (req.method, req.url)
        })
        .collect();
    let methods: Vec<&str> = seen.iter().map(|(m, _)| m.as_str()).collect();
    assert_eq!(methods, vec!["GET", "POST", "GET", "GET", "POST", "PUT", "DELETE"]);
}

// ---------------------------------------------------------------------------
// Paths, methods and bodies
// ---------------------------------------------------------------------------

#[test]
fn get_task_targets_task_path() {
    let backend = FakeBackend::fixed(1, 200, TASK_JSON);
    let task = backend.client(None).get_task("abc").unwrap();

    let req = backend.next_request();
    assert_eq!(req.method, "GET");
    assert_eq!(req.url, "/api/tasks/abc");
    assert_eq!(task.task_id, "abc");
    assert_eq!(task.files_skipped, 9);
}

#[test]
fn list_tasks_defaults_to_first_page_of_twenty() {
    let backend = FakeBackend::fixed(1, 200, r#"{"tasks":null,"total":0,"page":1,"page_size":20}"#);
    let page = backend.client(None).list_tasks(None, None).unwrap();

    let req = backend.next_request();
    assert_eq!(req.url, "/api/tasks?page=1&page_size=20");
    assert!(page.tasks.is_empty());
}

#[test]
fn list_tasks_forwards_pagination() {
    let backend = FakeBackend::fixed(1, 200, r#"{"tasks":[],"total":90,"page":3,"page_size":50}"#);
    let page = backend.client(None).list_tasks(Some(3), Some(50)).unwrap();

    assert_eq!(backend.next_request().url, "/api/tasks?page=3&page_size=50");
    assert_eq!(page.total, 90);
}

#[test]
fn delete_config_targets_config_path() {
    let backend = FakeBackend::fixed(1, 200, r#"{"message":"mapping deleted successfully"}"#);
    let resp = backend.client(None).delete_config(5).unwrap();

    let req = backend.next_request();
    assert_eq!(req.method, "DELETE");
    assert_eq!(req.url, "/api/configs/5");
    assert_eq!(resp.message, "mapping deleted successfully");
}

#[test]
fn generate_posts_payload_unchanged() {
    let backend = FakeBackend::fixed(1, 200, r#"{"task_id":"9d1","status":"running"}"#);
    let payload = json!({ "path": "movies", "mode": "full", "extra": [1, 2] });
    let resp = backend.client(None).generate(&payload).unwrap();

    let req = backend.next_request();
    assert_eq!(req.method, "POST");
    assert_eq!(req.url, "/api/generate");
    let sent: serde_json::Value = serde_json::from_str(&req.body).unwrap();
    assert_eq!(sent, payload);
    assert_eq!(resp.task_id, "9d1");
}

#[test]
fn create_and_update_config_send_payloads() {
    let mapping = r#"{"id":4,"name":"tv","source":"/alist/tv","target":"/strm/tv","enabled":true}"#;
    let backend = FakeBackend::fixed(2, 200, mapping);
    let client = backend.client(None);
    let payload = json!({ "name": "tv", "source": "/alist/tv", "target": "/strm/tv" });

    let created = client.create_config(&payload).unwrap();
    let updated = client.update_config(4, &payload).unwrap();

    let create_req = backend.next_request();
    assert_eq!((create_req.method.as_str(), create_req.url.as_str()), ("POST", "/api/configs"));
    let update_req = backend.next_request();
    assert_eq!((update_req.method.as_str(), update_req.url.as_str()), ("PUT", "/api/configs/4"));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&update_req.body).unwrap(),
        payload
    );
    assert_eq!(created.id, 4);
    assert!(updated.enabled);
}

#[test]
fn get_status_decodes_body() {
    let backend = FakeBackend::fixed(
        1,
        200,
        r#"{"version":"1.0.0","uptime":3600,"start_time":"2024-05-01T10:00:00Z"}"#,
    );
    let status = backend.client(None).get_status().unwrap();

    assert_eq!(backend.next_request().url, "/api/status");
    assert_eq!(status.version, "1.0.0");
    assert_eq!(status.uptime, 3600);
}

#[test]
fn custom_api_base_is_respected() {
    let backend = FakeBackend::fixed(1, 200, r#"{"configs":[]}"#);
    let server = ServerConfig {
        api_base: "/v2/api/".to_string(),
        ..backend.server_config()
    };
    ApiClient::new(&server, None).get_configs().unwrap();

    assert_eq!(backend.next_request().url, "/v2/api/configs");
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[test]
fn health_bypasses_api_base_and_token() {
    let backend = FakeBackend::fixed(1, 200, r#"{"status":"ok","version":"1.0.0"}"#);
    let client = backend.client(Some("s3cret"));

    let response = client.health().unwrap();

    let req = backend.next_request();
    assert_eq!(req.url, "/health");
    assert_eq!(req.header(TOKEN_HEADER), None);

    // The raw response comes back, not a decoded body.
    assert_eq!(response.status(), 200);
    let body: HealthBody = response.into_json().unwrap();
    assert_eq!(body.status, "ok");
}

#[test]
fn health_failure_is_not_reported_to_sink() {
    let backend = FakeBackend::fixed(1, 503, r#"{"status":"down"}"#);
    let (client, sink) = with_memory_sink(backend.client(None));

    assert!(client.health().is_err());
    assert!(sink.entries().is_empty());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn non_2xx_rejects_with_original_error_and_logs_once() {
    let backend = FakeBackend::fixed(1, 404, r#"{"error":"task not found"}"#);
    let (client, sink) = with_memory_sink(backend.client(None));

    let err = client.get_task("missing").unwrap_err();

    match err.downcast_ref::<ureq::Error>() {
        Some(ureq::Error::Status(code, _)) => assert_eq!(*code, 404),
        other => panic!("expected a status error, got {other:?}"),
    }
    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, Some(404));
    assert_eq!(entries[0].method, "GET");
    assert!(entries[0].url.ends_with("/api/tasks/missing"));
}

#[test]
fn unauthorized_is_surfaced_not_retried() {
    let backend = FakeBackend::fixed(1, 401, r#"{"error":"invalid or missing API token"}"#);
    let (client, sink) = with_memory_sink(backend.client(Some("wrong")));

    assert!(client.get_configs().is_err());
    assert_eq!(backend.next_request().header(TOKEN_HEADER), Some("wrong"));
    assert_eq!(sink.entries().len(), 1);
}

#[test]
fn transport_failure_rejects_and_logs_once() {
    // Grab a free port, then close it so nothing is listening.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let server = ServerConfig {
        url: format!("http://127.0.0.1:{port}"),
        timeout_ms: 1_000,
        ..ServerConfig::default()
    };
    let (client, sink) = with_memory_sink(ApiClient::new(&server, None));

    let err = client.get_status().unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ureq::Error>(),
        Some(ureq::Error::Transport(_))
    ));
    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, None);
}

#[test]
fn timeout_rejects_and_logs_once() {
    // Accept the connection but never answer.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            thread::sleep(Duration::from_secs(3));
            drop(stream);
        }
    });
    let server = ServerConfig {
        url: format!("http://{addr}"),
        timeout_ms: 300,
        ..ServerConfig::default()
    };
    let (client, sink) = with_memory_sink(ApiClient::new(&server, None));

    let started = Instant::now();
    let err = client.get_status().unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(err.downcast_ref::<ureq::Error>().is_some());
    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, None);
    assert!(entries[0].url.ends_with("/api/status"));
}

#[test]
fn failed_list_tasks_logs_full_url() {
    let backend = FakeBackend::fixed(1, 500, r#"{"error":"failed to list tasks"}"#);
    let (client, sink) = with_memory_sink(backend.client(None));

    assert!(client.list_tasks(None, None).is_err());

    assert_eq!(backend.next_request().url, "/api/tasks?page=1&page_size=20");
    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].url,
        format!("{}/api/tasks?page=1&page_size=20", backend.origin)
    );
}

#[test]
fn undecodable_body_rejects_and_logs_once() {
    let backend = FakeBackend::fixed(1, 200, "<html>proxy login</html>");
    let (client, sink) = with_memory_sink(backend.client(None));

    let err = client.get_status().unwrap_err();

    assert!(format!("{err:#}").contains("failed to decode response"));
    assert_eq!(sink.entries().len(), 1);
}

#[test]
fn successful_calls_log_nothing() {
    let backend = FakeBackend::fixed(1, 200, r#"{"configs":[]}"#);
    let (client, sink) = with_memory_sink(backend.client(None));

    client.get_configs().unwrap();
    assert!(sink.entries().is_empty());
}
