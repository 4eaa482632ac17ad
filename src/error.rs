//! Error types for Trellis
//!
//! This module defines all error types used throughout the bot host.
//! Uses `thiserror` for ergonomic error handling with automatic `Display`
//! and `Error` trait implementations.

use thiserror::Error;

/// The primary error type for Trellis operations.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration-related errors (invalid config, bad plugin descriptor, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plugin loading errors (invalid binary, missing entry point, load hook failure)
    #[error("Plugin load error: {0}")]
    Load(String),

    /// Errors raised from inside a plugin command body
    #[error("Plugin error: {0}")]
    Plugin(String),

    /// Chat service errors (send failures, member lookups, etc.)
    #[error("Chat error: {0}")]
    Chat(String),

    /// Plugin state storage errors
    #[error("State error: {0}")]
    State(String),

    /// Resource not found (plugins, triggers, members, etc.)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for Trellis operations.
pub type Result<T> = std::result::Result<T, BotError>;
