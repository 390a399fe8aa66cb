//! TOML configuration for the `board` binary and HTTP server.
//!
//! Only `[db]` is required. Every other section falls back to defaults that
//! match a stock single-node board.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use project_board_core::pagination::{BAR_LENGTH, DEFAULT_PAGE_SIZE};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_bar_length")]
    pub bar_length: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            bar_length: BAR_LENGTH,
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_bar_length() -> usize {
    BAR_LENGTH
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Actor recorded in audit fields when a request names none.
#[derive(Debug, Deserialize, Clone)]
pub struct AuditConfig {
    #[serde(default = "default_actor")]
    pub default_actor: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_actor: default_actor(),
        }
    }
}

fn default_actor() -> String {
    "system".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

impl Config {
    /// The acting user: `requested` when given and non-blank, otherwise the
    /// configured default actor.
    pub fn actor(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim) {
            Some(a) if !a.is_empty() => a.to_string(),
            _ => self.audit.default_actor.clone(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.pagination.page_size == 0 {
        anyhow::bail!("pagination.page_size must be >= 1");
    }

    if config.pagination.bar_length == 0 {
        anyhow::bail!("pagination.bar_length must be >= 1");
    }

    if config.audit.default_actor.trim().is_empty() {
        anyhow::bail!("audit.default_actor must not be blank");
    }

    Ok(config)
}
