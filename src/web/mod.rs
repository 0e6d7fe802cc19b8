//! Local console server.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that resolves each
//! request path through the route table and renders the bound view from
//! live backend data. Every path that is not in the route table is a 404.
//!
//! Launched via `strm-console serve` (default: `http://127.0.0.1:9747`).

pub mod views;

use std::io::Cursor;

use anyhow::Result;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::api::{ApiClient, HealthBody};
use crate::routes::{self, View};
use views::DashboardData;

/// Tasks shown on the dashboard.
const RECENT_TASKS: u32 = 5;

type HtmlResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the console server on the given address.
///
/// Blocks the current thread and handles requests one at a time.
pub fn serve(addr: &str, client: &ApiClient, page_size: u32) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("strm console running at http://{addr}");
    println!("backend: {}", client.origin());
    println!("Press Ctrl+C to stop.\n");

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let response = dispatch(&method, &url, client, page_size);
        let code = response.status_code().0;
        let _ = request.respond(response);

        println!(
            "{} {} {} {}",
            method,
            url,
            code,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Map a request onto a view and render it.
pub fn dispatch(method: &Method, url: &str, client: &ApiClient, page_size: u32) -> HtmlResponse {
    if *method != Method::Get {
        return html(405, views::layout(View::Dashboard, "<p>Method not allowed.</p>"));
    }

    let Some(route) = routes::resolve(url) else {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        return html(404, views::not_found(path));
    };

    match render(route.view, url, client, page_size) {
        Ok(page) => html(200, page),
        Err(e) => html(502, views::error(route.view, &format!("{e:#}"))),
    }
}

fn render(view: View, url: &str, client: &ApiClient, page_size: u32) -> Result<String> {
    match view {
        View::Dashboard => {
            // A failing health check is part of the dashboard, not an error.
            let health = client
                .health()
                .ok()
                .and_then(|resp| resp.into_json::<HealthBody>().ok());
            let status = client.get_status()?;
            let recent = client.list_tasks(Some(1), Some(RECENT_TASKS))?;
            Ok(views::dashboard(&DashboardData {
                health,
                status,
                recent: recent.tasks,
            }))
        }
        View::Tasks => {
            let page = parse_query_param(url, "page");
            let size = parse_query_param(url, "page_size").or(Some(page_size));
            let tasks = client.list_tasks(page, size)?;
            Ok(views::tasks(&tasks))
        }
        View::Configs => Ok(views::configs(&client.get_configs()?)),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a numeric `?key=N` query parameter from a URL.
fn parse_query_param(url: &str, key: &str) -> Option<u32> {
    let query = url.split('?').nth(1)?;
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key { v.parse().ok() } else { None }
    })
}

fn html(code: u16, body: String) -> HtmlResponse {
    Response::from_data(body.into_bytes())
        .with_header(content_type_html())
        .with_status_code(StatusCode(code))
}

fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").expect("static header")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
