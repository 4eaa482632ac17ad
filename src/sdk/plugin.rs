//! The plugin and command contracts.

use async_trait::async_trait;

use crate::error::Result;
use crate::plugins::LoadingContext;

use super::context::CommandContext;
use super::meta::{CommandScope, PluginMeta, UserRole};

/// The contract a loadable module type must implement.
///
/// One binary may bundle several `BotPlugin` implementations; each is
/// activated and supervised independently.
#[async_trait]
pub trait BotPlugin: Send + Sync {
    /// The plugin's immutable descriptor.
    fn meta(&self) -> &PluginMeta;

    /// Load hook. This is the only place commands can be registered.
    ///
    /// An error here aborts activation of this plugin only; other plugins
    /// in the same binary are unaffected.
    async fn on_loaded(&self, ctx: &LoadingContext) -> Result<()>;

    /// Teardown hook. Failures are swallowed by the supervisor; the
    /// isolation context is released regardless.
    async fn on_unloaded(&self) -> Result<()>;
}

/// A single chat command owned by a plugin.
#[async_trait]
pub trait BotCommand: Send + Sync {
    /// The token following the bot mention that selects this command.
    fn trigger(&self) -> &str;

    /// Additional trigger strings mapping to this command.
    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }

    fn scope(&self) -> CommandScope {
        CommandScope::Group
    }

    /// Minimum caller privilege.
    fn min_role(&self) -> UserRole {
        UserRole::Member
    }

    /// Execute the command. The body may run concurrently with itself;
    /// implementations must be safe for concurrent invocation.
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}
