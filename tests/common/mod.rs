//! In-process fake STRM backend for integration tests.
//!
//! Binds `tiny_http` to an ephemeral port, answers a fixed number of
//! requests with a handler, and records every request it saw.

#![allow(dead_code)]

use std::io::Read;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use strm_console::api::ApiClient;
use strm_console::config::schema::ServerConfig;
use tiny_http::{Header, Response, Server, StatusCode};

/// One request as received by the fake backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct FakeBackend {
    pub origin: String,
    requests: Receiver<Recorded>,
}

impl FakeBackend {
    /// Serve `count` requests, answering each with `handler`.
    pub fn start<F>(count: usize, handler: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, String) + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").expect("bind fake backend");
        let addr = server
            .server_addr()
            .to_ip()
            .expect("fake backend listens on tcp");
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for _ in 0..count {
                let Ok(mut request) = server.recv() else {
                    return;
                };
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let recorded = Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string(), h.value.to_string()))
                        .collect(),
                    body,
                };

                let (code, payload) = handler(&recorded);
                let _ = tx.send(recorded);
                let response = Response::from_string(payload)
                    .with_status_code(StatusCode(code))
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json").unwrap(),
                    );
                let _ = request.respond(response);
            }
        });

        Self {
            origin: format!("http://{addr}"),
            requests: rx,
        }
    }

    /// Always answer with the same status and body.
    pub fn fixed(count: usize, code: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::start(count, move |_| (code, body.clone()))
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            url: self.origin.clone(),
            ..ServerConfig::default()
        }
    }

    pub fn client(&self, token: Option<&str>) -> ApiClient {
        ApiClient::new(&self.server_config(), token.map(str::to_string))
    }

    /// Next recorded request; panics if none arrives within two seconds.
    pub fn next_request(&self) -> Recorded {
        self.requests
            .recv_timeout(Duration::from_secs(2))
            .expect("fake backend received no request")
    }
}
