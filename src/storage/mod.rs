/// File-backed key/value store for per-user client state.
///
/// Holds string values under string keys in `~/.strm-console/storage.json`.
/// The API client only ever reads the [`API_TOKEN_KEY`] entry; writes come
/// from `strm-console token set|clear`.
///
/// Reads are best-effort: a missing or malformed file behaves like an empty
/// store.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Key under which the API credential is stored.
pub const API_TOKEN_KEY: &str = "api_token";

#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Open the store at `~/.strm-console/storage.json`.
    pub fn open_default() -> Result<Self> {
        let dir = crate::config::state_dir().context("could not determine home directory")?;
        Ok(Self::at(dir.join("storage.json")))
    }

    /// Open a store backed by an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    /// Remove a key. Removing a key that is not present is not an error.
    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.read_all();
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    /// The stored API token, if one is set and non-empty.
    pub fn api_token(&self) -> Option<String> {
        self.get_item(API_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create storage directory")?;
        }
        let json = serde_json::to_string_pretty(items).context("failed to serialize storage")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
