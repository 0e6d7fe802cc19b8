use anyhow::Result;
use clap::{Parser, Subcommand};

use strm_console::api::ApiClient;
use strm_console::cli::{self, ConfigAction, OutputFormat, TokenAction};
use strm_console::config;
use strm_console::storage::LocalStorage;

#[derive(Debug, Parser)]
#[command(name = "strm-console")]
#[command(about = "Client console for the STRM generation backend")]
struct App {
    /// Output format: table (default), json
    #[arg(long, global = true, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check the backend's unauthenticated /health endpoint
    Health,
    /// Start a STRM generation run
    Generate {
        /// Mapping name to run (default: all enabled mappings)
        #[arg(long)]
        path: Option<String>,
        /// incremental or full
        #[arg(long)]
        mode: Option<String>,
    },
    /// Show one task
    Task { id: String },
    /// List tasks, newest first
    Tasks {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// List path mappings
    Configs,
    /// Create a mapping from a JSON payload
    ConfigCreate { payload: String },
    /// Update a mapping from a JSON payload
    ConfigUpdate { id: String, payload: String },
    /// Delete a mapping
    ConfigDelete { id: String },
    /// Show backend version and uptime
    Status,
    /// Print the console route table
    Routes,
    /// Serve the console views locally
    Serve {
        /// Listen address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Manage the stored API token
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },
    /// Manage strm-console configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
enum TokenCommand {
    /// Show the stored token (masked)
    Show,
    /// Store a token
    Set { token: String },
    /// Remove the stored token
    Clear,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.strm-console/config.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `server.url http://nas:8080`
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let fmt = OutputFormat::from_str_opt(Some(&app.format));

    let settings = config::load();
    // Only backend and token commands open the token store.
    let client = || -> Result<ApiClient> {
        Ok(ApiClient::from_config(&settings, &LocalStorage::open_default()?))
    };

    match app.command {
        Commands::Token { action } => {
            let action = match action {
                TokenCommand::Show => TokenAction::Show,
                TokenCommand::Set { token } => TokenAction::Set(token),
                TokenCommand::Clear => TokenAction::Clear,
            };
            cli::run_token(&LocalStorage::open_default()?, action)
        }
        Commands::Config { action } => {
            let action = match action {
                ConfigCommand::Show => ConfigAction::Show,
                ConfigCommand::Init { force } => ConfigAction::Init { force },
                ConfigCommand::Set { key, value } => ConfigAction::Set { key, value },
                ConfigCommand::Reset => ConfigAction::Reset,
            };
            cli::run_config(action)
        }
        Commands::Routes => cli::run_routes(fmt),
        Commands::Health => cli::run_health(&client()?, fmt),
        Commands::Generate { path, mode } => cli::run_generate(&client()?, path, mode, fmt),
        Commands::Task { id } => cli::run_task(&client()?, &id, fmt),
        Commands::Tasks { page, page_size } => cli::run_tasks(&client()?, page, page_size, fmt),
        Commands::Configs => cli::run_configs(&client()?, fmt),
        Commands::ConfigCreate { payload } => cli::run_config_create(&client()?, &payload, fmt),
        Commands::ConfigUpdate { id, payload } => {
            cli::run_config_update(&client()?, &id, &payload, fmt)
        }
        Commands::ConfigDelete { id } => cli::run_config_delete(&client()?, &id, fmt),
        Commands::Status => cli::run_status(&client()?, fmt),
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| settings.web.addr.clone());
            strm_console::web::serve(&addr, &client()?, settings.web.page_size)
        }
    }
}
