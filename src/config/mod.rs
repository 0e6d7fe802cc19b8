/// Configuration system for strm-console.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — [`schema::ConsoleConfig::default()`]
/// 2. **User global config** — `~/.strm-console/config.toml`
/// 3. **Project local config** — `.strm-console.toml` in the current directory
/// 4. **Environment variables** — `STRM_*` overrides (highest precedence)
///
/// File layers are merged key by key, so a project file that only sets
/// `server.url` keeps the timeout from the global file.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::ConsoleConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> ConsoleConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files over the defaults, in order.
///
/// Missing or malformed files are skipped.
pub fn load_layers(paths: &[Option<PathBuf>]) -> ConsoleConfig {
    let mut merged = match toml::Value::try_from(ConsoleConfig::default()) {
        Ok(v) => v,
        Err(_) => return ConsoleConfig::default(),
    };

    for path in paths.iter().flatten() {
        if let Some(layer) = load_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    merged.try_into().unwrap_or_default()
}

fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Recursively overlay `overlay` onto `base`. Tables merge, everything else
/// replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding all per-user state: config, local storage, error log.
pub fn state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".strm-console"))
}

fn global_config_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".strm-console.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `STRM_SERVER_URL` — backend origin
/// - `STRM_API_BASE` — API path prefix
/// - `STRM_TIMEOUT_MS` — request timeout
/// - `STRM_WEB_ADDR` — listen address for `serve`
/// - `STRM_LOG_ERRORS` — JSONL error log (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut ConsoleConfig) {
    if let Ok(val) = std::env::var("STRM_SERVER_URL")
        && !val.is_empty()
    {
        config.server.url = val;
    }
    if let Ok(val) = std::env::var("STRM_API_BASE")
        && !val.is_empty()
    {
        config.server.api_base = val;
    }
    if let Ok(val) = std::env::var("STRM_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.server.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("STRM_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("STRM_LOG_ERRORS") {
        config.logging.error_log = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.strm-console/config.toml`.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.strm-console/ directory")?;
    }

    fs::write(&path, ConsoleConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a dotted key (e.g. `server.url`) in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        toml::Value::try_from(ConsoleConfig::default())
            .context("failed to serialize default config")?
    };

    set_toml_value(&mut root, key, value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The new value takes the type of the value it replaces.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config keys are dotted, e.g. server.url (got '{key}')");
    };

    let mut current = root;
    for part in section.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults.
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
