//! Host configuration.
//!
//! A single JSON file; every field has a default so a missing file or a
//! partial file both work.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The bot's own user id; commands must mention this id.
    pub bot_id: u64,
    pub plugins: PluginHostConfig,
    /// tracing-subscriber env-filter directive (e.g. "info,trellis=debug").
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_id: 0,
            plugins: PluginHostConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginHostConfig {
    /// Directory scanned for plugin artifacts.
    pub plugin_dir: PathBuf,
    /// Shadow-copy cache directory.
    pub shadow_dir: PathBuf,
    /// Load everything in `plugin_dir` at startup.
    pub autoload: bool,
}

impl Default for PluginHostConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .map(|d| d.join("trellis"))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            plugin_dir: base.join("plugins"),
            shadow_dir: base.join("shadow"),
            autoload: true,
        }
    }
}

impl Config {
    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
