//! Trellis - extensible group-chat bot host with a fault-contained plugin runtime

pub mod channels;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod plugins;
pub mod sdk;
pub mod state;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::Config;
pub use error::{BotError, Result};
