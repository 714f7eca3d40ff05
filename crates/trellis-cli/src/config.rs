//! CLI configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Frontier discipline for traversals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Breadth-first
    #[default]
    Bfs,
    /// Depth-first
    Dfs,
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bfs => write!(f, "bfs"),
            Self::Dfs => write!(f, "dfs"),
        }
    }
}

/// Get default config file path
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trellis")
        .join("config.toml")
}

/// Resolve the config file path, preferring an explicit one
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path)
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Traversal order when `--order` is not given
    pub order: Order,
    /// Follow edge direction when neither `--directed` nor `--undirected` is given
    pub directed: bool,
    /// Output format when `--format` is not given
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            order: Order::Bfs,
            directed: false,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["order", "directed", "format"]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "order" => Some(self.order.to_string()),
            "directed" => Some(self.directed.to_string()),
            "format" => Some(self.format.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "order" => {
                self.order = Order::from_str(value, true)
                    .map_err(|e| anyhow::anyhow!("Invalid order '{}': {}", value, e))?;
            }
            "directed" => {
                self.directed = value
                    .parse()
                    .with_context(|| format!("Invalid boolean '{}'", value))?;
            }
            "format" => {
                self.format = OutputFormat::from_str(value, true)
                    .map_err(|e| anyhow::anyhow!("Invalid format '{}': {}", value, e))?;
            }
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}
