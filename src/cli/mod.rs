//! CLI command implementations.
//!
//! One handler per backend operation, plus local management commands:
//! - `strm-console health|status` — backend liveness and uptime
//! - `strm-console generate|task|tasks` — STRM generation runs
//! - `strm-console configs|config-create|config-update|config-delete` — mappings
//! - `strm-console routes` — the console route table
//! - `strm-console token show|set|clear` — stored API credential
//! - `strm-console config show|init|set|reset` — client configuration

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::api::{ApiClient, GenerateRequest, Mapping, Task, TaskPage};
use crate::config;
use crate::routes;
use crate::storage::{API_TOKEN_KEY, LocalStorage};

/// Output format for every command that prints backend data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Parse a JSON payload given on the command line. The value is forwarded
/// to the backend as-is.
pub fn parse_payload(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).context("payload is not valid JSON")
}

// ---------------------------------------------------------------------------
// strm-console health / status
// ---------------------------------------------------------------------------

pub fn run_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let response = client.health()?;
    let code = response.status();
    let status_text = response.status_text().to_string();
    let body = response
        .into_string()
        .context("failed to read health response")?;

    match format {
        OutputFormat::Json => {
            let body = serde_json::from_str::<serde_json::Value>(&body)
                .unwrap_or(serde_json::Value::String(body));
            print_json(&serde_json::json!({ "status_code": code, "body": body }))?;
        }
        OutputFormat::Table => {
            println!("{}", "Backend Health".bold().cyan());
            println!("{}", "=".repeat(40));
            println!("  {} {} {}", "HTTP:".bold(), code, status_text);
            println!("  {} {}", "Body:".bold(), body.trim());
        }
    }
    Ok(())
}

pub fn run_status(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let status = client.get_status()?;

    match format {
        OutputFormat::Json => print_json(&status)?,
        OutputFormat::Table => {
            println!("{}", "Backend Status".bold().cyan());
            println!("{}", "=".repeat(40));
            println!("  {} {}", "Version:".bold(), status.version);
            println!(
                "  {} {}",
                "Uptime: ".bold(),
                crate::web::views::format_uptime(status.uptime)
            );
            println!("  {} {}", "Started:".bold(), status.start_time.to_rfc3339());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// strm-console generate / task / tasks
// ---------------------------------------------------------------------------

pub fn run_generate(
    client: &ApiClient,
    path: Option<String>,
    mode: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let resp = client.generate(&GenerateRequest { path, mode })?;

    match format {
        OutputFormat::Json => print_json(&resp)?,
        OutputFormat::Table => {
            println!(
                "{} task {} ({})",
                "Started".green().bold(),
                resp.task_id,
                resp.status
            );
            println!("  follow with: strm-console task {}", resp.task_id);
        }
    }
    Ok(())
}

pub fn run_task(client: &ApiClient, task_id: &str, format: OutputFormat) -> Result<()> {
    let task = client.get_task(task_id)?;

    match format {
        OutputFormat::Json => print_json(&task)?,
        OutputFormat::Table => print_task_detail(&task),
    }
    Ok(())
}

pub fn run_tasks(
    client: &ApiClient,
    page: Option<u32>,
    page_size: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let tasks = client.list_tasks(page, page_size)?;

    match format {
        OutputFormat::Json => print_json(&tasks)?,
        OutputFormat::Table => print_task_page(&tasks),
    }
    Ok(())
}

fn colored_status(status: &str) -> colored::ColoredString {
    match status {
        "completed" => status.green(),
        "failed" => status.red(),
        _ => status.yellow(),
    }
}

fn print_task_detail(task: &Task) {
    println!("{} {}", "Task".bold().cyan(), task.task_id);
    println!("{}", "=".repeat(40));
    println!("  {} {}", "Config: ".bold(), task.config_name);
    println!("  {} {}", "Mode:   ".bold(), task.mode);
    println!("  {} {}", "Status: ".bold(), colored_status(&task.status));
    println!(
        "  {} {} created, {} deleted, {} skipped",
        "Files:  ".bold(),
        task.files_created,
        task.files_deleted,
        task.files_skipped
    );
    println!("  {} {}", "Started:".bold(), task.started_at.to_rfc3339());
    if let Some(done) = task.completed_at {
        println!("  {} {}", "Done:   ".bold(), done.to_rfc3339());
    }
    if let Some(errors) = task.errors.as_deref().filter(|e| !e.is_empty()) {
        println!("  {} {}", "Errors: ".bold().red(), errors);
    }
}

fn print_task_page(page: &TaskPage) {
    println!(
        "{} ({} total, page {} of {})",
        "Tasks".bold().cyan(),
        page.total,
        page.page,
        page.page_count().max(1)
    );

    if page.tasks.is_empty() {
        println!("{}", "No tasks on this page.".yellow());
        return;
    }

    println!(
        "  {:<10} {:<16} {:<12} {:<10} {:>7} {:>7} {:>7}",
        "Task", "Config", "Mode", "Status", "Created", "Deleted", "Skipped"
    );
    println!("  {}", "-".repeat(76));
    for t in &page.tasks {
        println!(
            "  {:<10} {:<16} {:<12} {:<10} {:>7} {:>7} {:>7}",
            crate::web::views::short_id(&t.task_id),
            truncate(&t.config_name, 16),
            t.mode,
            colored_status(&t.status),
            t.files_created,
            t.files_deleted,
            t.files_skipped,
        );
    }
}

// ---------------------------------------------------------------------------
// strm-console configs / config-create / config-update / config-delete
// ---------------------------------------------------------------------------

pub fn run_configs(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let list = client.get_configs()?;

    match format {
        OutputFormat::Json => print_json(&list)?,
        OutputFormat::Table => {
            println!("{}", "Mappings".bold().cyan());
            if list.configs.is_empty() {
                println!("{}", "No mappings configured.".yellow());
                return Ok(());
            }
            println!(
                "  {:>4} {:<16} {:<24} {:<24} {:<12} Enabled",
                "ID", "Name", "Source", "Target", "Mode"
            );
            println!("  {}", "-".repeat(90));
            for m in &list.configs {
                let enabled = if m.enabled { "yes".green() } else { "no".red() };
                println!(
                    "  {:>4} {:<16} {:<24} {:<24} {:<12} {}",
                    m.id,
                    truncate(&m.name, 16),
                    truncate(&m.source, 24),
                    truncate(&m.target, 24),
                    m.mode,
                    enabled
                );
            }
        }
    }
    Ok(())
}

fn print_mapping(action: &str, mapping: &Mapping, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(mapping)?,
        OutputFormat::Table => println!(
            "{} mapping #{} {} ({} -> {})",
            action.green().bold(),
            mapping.id,
            mapping.name,
            mapping.source,
            mapping.target
        ),
    }
    Ok(())
}

pub fn run_config_create(client: &ApiClient, payload: &str, format: OutputFormat) -> Result<()> {
    let payload = parse_payload(payload)?;
    let mapping = client.create_config(&payload)?;
    print_mapping("Created", &mapping, format)
}

pub fn run_config_update(
    client: &ApiClient,
    id: &str,
    payload: &str,
    format: OutputFormat,
) -> Result<()> {
    let payload = parse_payload(payload)?;
    let mapping = client.update_config(id, &payload)?;
    print_mapping("Updated", &mapping, format)
}

pub fn run_config_delete(client: &ApiClient, id: &str, format: OutputFormat) -> Result<()> {
    let resp = client.delete_config(id)?;

    match format {
        OutputFormat::Json => print_json(&resp)?,
        OutputFormat::Table => println!("{} {}", "Deleted".green().bold(), resp.message),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// strm-console routes
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RouteRow {
    path: &'static str,
    name: &'static str,
    view: String,
}

pub fn run_routes(format: OutputFormat) -> Result<()> {
    let rows: Vec<RouteRow> = routes::routes()
        .iter()
        .map(|r| RouteRow {
            path: r.path,
            name: r.name,
            view: r.view.to_string(),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => {
            println!(
                "{} (history: {:?})",
                "Console Routes".bold().cyan(),
                routes::HISTORY
            );
            for row in &rows {
                println!("  {:<10} {:<10} {}", row.path, row.name, row.view);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// strm-console token
// ---------------------------------------------------------------------------

/// `token show|set|clear` sub-action.
#[derive(Debug, Clone)]
pub enum TokenAction {
    Show,
    Set(String),
    Clear,
}

pub fn run_token(storage: &LocalStorage, action: TokenAction) -> Result<()> {
    match action {
        TokenAction::Show => match storage.api_token() {
            Some(token) => println!("{} {}", "Token:".bold(), mask_token(&token)),
            None => println!("{}", "No API token stored.".yellow()),
        },
        TokenAction::Set(token) => {
            storage.set_item(API_TOKEN_KEY, &token)?;
            println!(
                "{} stored in {}",
                "Token".green().bold(),
                storage.path().display()
            );
        }
        TokenAction::Clear => {
            storage.remove_item(API_TOKEN_KEY)?;
            println!("{}", "Token cleared.".green());
        }
    }
    Ok(())
}

/// Show only the first four characters of a credential.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "*".repeat(token.chars().count())
    } else {
        format!("{visible}****")
    }
}

// ---------------------------------------------------------------------------
// strm-console config
// ---------------------------------------------------------------------------

/// `config show|init|set|reset` sub-action.
#[derive(Debug, Clone)]
pub enum ConfigAction {
    Show,
    Init { force: bool },
    Set { key: String, value: String },
    Reset,
}

pub fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_text = config::show_effective_config()?;
            if let Some(path) = config::global_config_file() {
                let state = if path.exists() { "found" } else { "not found" };
                println!("# global config: {} ({state})", path.display());
            }
            print!("{toml_text}");
        }
        ConfigAction::Init { force } => {
            let path = config::init_config(force)?;
            println!("{} {}", "Wrote".green().bold(), path.display());
        }
        ConfigAction::Set { key, value } => {
            config::set_config_value(&key, &value)?;
            println!("{} {key} = {value}", "Set".green().bold());
        }
        ConfigAction::Reset => {
            let path = config::reset_config()?;
            println!("{} {}", "Reset".green().bold(), path.display());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
