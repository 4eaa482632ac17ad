//! Plugin descriptors and the enums shared across the contract surface.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

static ID_RE: OnceLock<Regex> = OnceLock::new();

/// Immutable identity of a plugin, supplied by the plugin itself at
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMeta {
    /// Globally-unique plugin id. 1-64 characters, alphanumeric plus
    /// hyphens and dots, starting with an alphanumeric.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Semantic version string (e.g., "1.0.0").
    pub version: String,
    pub author: String,
    pub description: String,
}

impl PluginMeta {
    /// Validate the descriptor shape before a registration is installed.
    pub fn validate(&self) -> Result<()> {
        let id_re =
            ID_RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9\-\.]{0,63}$").unwrap());
        if !id_re.is_match(&self.id) {
            return Err(BotError::Config(format!(
                "Invalid plugin id '{}': must be 1-64 alphanumeric characters, hyphens or dots, starting with alphanumeric",
                self.id
            )));
        }

        if self.version.trim().is_empty() {
            return Err(BotError::Config(format!(
                "Plugin '{}' has an empty version string",
                self.id
            )));
        }

        Ok(())
    }
}

/// Declared breadth of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandScope {
    /// Available in every group the bot is in.
    Global,
    /// Limited to the group the command was configured for.
    Group,
}

/// Caller privilege levels, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    Auditor,
    Admin,
    Owner,
}

/// Breadth a stored plugin state value applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageScope {
    Global,
    Group,
    User,
    GroupUser,
}
