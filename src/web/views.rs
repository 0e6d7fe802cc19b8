//! Server-rendered HTML for the three console views.
//!
//! Every function here is pure: data in, markup out. Fetching happens in
//! the parent module.

use std::fmt::Write;

use crate::api::{ConfigList, HealthBody, Status, Task, TaskPage};
use crate::routes::{self, View};

/// Data shown on the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// `None` when the health check failed.
    pub health: Option<HealthBody>,
    pub status: Status,
    pub recent: Vec<Task>,
}

const STYLE: &str = r#"
:root { --bg:#0d1117; --surface:#161b22; --border:#30363d; --text:#e6edf3; --muted:#8b949e; --accent:#58a6ff; --green:#3fb950; --red:#f85149; --yellow:#d29922; }
* { margin:0; padding:0; box-sizing:border-box; }
body { background:var(--bg); color:var(--text); font-family:-apple-system,'Segoe UI',Helvetica,Arial,sans-serif; font-size:14px; line-height:1.5; }
.app { max-width:1100px; margin:0 auto; padding:24px; }
nav { display:flex; gap:16px; margin-bottom:24px; padding-bottom:16px; border-bottom:1px solid var(--border); }
nav a { color:var(--muted); text-decoration:none; font-weight:600; }
nav a.active { color:var(--accent); }
.card { background:var(--surface); border:1px solid var(--border); border-radius:8px; padding:16px; margin-bottom:16px; }
table { width:100%; border-collapse:collapse; }
th, td { text-align:left; padding:6px 8px; border-bottom:1px solid var(--border); }
.ok { color:var(--green); } .bad { color:var(--red); } .warn { color:var(--yellow); }
.pager { display:flex; gap:12px; margin-top:12px; }
.pager a { color:var(--accent); }
"#;

/// Wrap a view body in the page chrome with the route table as navigation.
pub fn layout(active: View, body: &str) -> String {
    let mut nav = String::new();
    for route in routes::routes() {
        let class = if route.view == active { " class=\"active\"" } else { "" };
        let _ = write!(
            nav,
            "<a href=\"{}\"{class}>{}</a>",
            routes::href(route.view),
            route.name
        );
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>STRM Console · {active}</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n<div class=\"app\">\n<nav>{nav}</nav>\n{body}\n</div>\n</body>\n</html>\n"
    )
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

pub fn dashboard(data: &DashboardData) -> String {
    let health = match &data.health {
        Some(h) => format!(
            "<span class=\"ok\">{}</span> (v{})",
            escape(&h.status),
            escape(&h.version)
        ),
        None => "<span class=\"bad\">unreachable</span>".to_string(),
    };

    let mut body = format!(
        "<div class=\"card\"><h2>Backend</h2>\
         <p>Health: {health}</p>\
         <p>Version: {}</p>\
         <p>Uptime: {}</p>\
         <p>Started: {}</p></div>",
        escape(&data.status.version),
        format_uptime(data.status.uptime),
        data.status.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
    );

    body.push_str("<div class=\"card\"><h2>Recent tasks</h2>");
    body.push_str(&task_table(&data.recent));
    body.push_str("</div>");

    layout(View::Dashboard, &body)
}

pub fn tasks(page: &TaskPage) -> String {
    let mut body = format!(
        "<div class=\"card\"><h2>Tasks</h2><p>{} total · page {} of {}</p>",
        page.total,
        page.page,
        page.page_count().max(1)
    );
    body.push_str(&task_table(&page.tasks));

    body.push_str("<div class=\"pager\">");
    let base = routes::href(View::Tasks);
    if page.page > 1 {
        let _ = write!(
            body,
            "<a href=\"{base}?page={}&page_size={}\">&larr; Newer</a>",
            page.page - 1,
            page.page_size
        );
    }
    if u64::from(page.page) < page.page_count() {
        let _ = write!(
            body,
            "<a href=\"{base}?page={}&page_size={}\">Older &rarr;</a>",
            page.page + 1,
            page.page_size
        );
    }
    body.push_str("</div></div>");

    layout(View::Tasks, &body)
}

pub fn configs(list: &ConfigList) -> String {
    let mut body = String::from("<div class=\"card\"><h2>Configs</h2>");

    if list.configs.is_empty() {
        body.push_str("<p>No mappings configured.</p>");
    } else {
        body.push_str(
            "<table><tr><th>ID</th><th>Name</th><th>Source</th><th>Target</th>\
             <th>Mode</th><th>STRM</th><th>Cron</th><th>Enabled</th></tr>",
        );
        for m in &list.configs {
            let enabled = if m.enabled {
                "<span class=\"ok\">yes</span>"
            } else {
                "<span class=\"warn\">no</span>"
            };
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td>{}</td><td>{}</td><td>{enabled}</td></tr>",
                m.id,
                escape(&m.name),
                escape(&m.source),
                escape(&m.target),
                escape(&m.mode),
                escape(&m.strm_mode),
                escape(&m.cron_expr),
            );
        }
        body.push_str("</table>");
    }
    body.push_str("</div>");

    layout(View::Configs, &body)
}

/// Shown in place of a view when a backend call failed.
pub fn error(active: View, message: &str) -> String {
    let body = format!(
        "<div class=\"card\"><h2 class=\"bad\">Backend request failed</h2><pre>{}</pre></div>",
        escape(message)
    );
    layout(active, &body)
}

pub fn not_found(path: &str) -> String {
    let body = format!(
        "<div class=\"card\"><h2>Not found</h2><p>No view at <code>{}</code>.</p></div>",
        escape(path)
    );
    layout(View::Dashboard, &body)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn task_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "<p>No tasks yet.</p>".to_string();
    }

    let mut out = String::from(
        "<table><tr><th>Task</th><th>Config</th><th>Mode</th><th>Status</th>\
         <th>Created</th><th>Deleted</th><th>Skipped</th><th>Started</th></tr>",
    );
    for t in tasks {
        let class = match t.status.as_str() {
            "completed" => "ok",
            "failed" => "bad",
            _ => "warn",
        };
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{class}\">{}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(short_id(&t.task_id)),
            escape(&t.config_name),
            escape(&t.mode),
            escape(&t.status),
            t.files_created,
            t.files_deleted,
            t.files_skipped,
            t.started_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    out.push_str("</table>");
    out
}

/// First eight characters of a task id.
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

pub fn format_uptime(secs: i64) -> String {
    let secs = secs.max(0);
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let minutes = rem / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m {}s", rem % 60)
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
