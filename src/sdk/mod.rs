//! Plugin SDK for Trellis
//!
//! Everything a plugin author needs: the plugin/command contracts, the
//! per-invocation command context, the scoped state accessor, the curated
//! bot capability facade, and the shared-library entry point declaration.
//!
//! A plugin crate builds as a `cdylib`, implements [`BotPlugin`] for one or
//! more types, and exports them through [`export_plugin!`]:
//!
//! ```ignore
//! use trellis::export_plugin;
//! use trellis::sdk::PluginRegistrar;
//!
//! fn register(registrar: &mut PluginRegistrar) {
//!     registrar.register(Box::new(MyPlugin::new()));
//! }
//!
//! export_plugin!(register);
//! ```

mod abi;
mod bot_api;
mod context;
mod meta;
mod plugin;
mod state;

pub use abi::{PluginDeclaration, PluginRegistrar, PLUGIN_ENTRY_SYMBOL, TRELLIS_ABI_VERSION};
pub use bot_api::BotApi;
pub use context::CommandContext;
pub use meta::{CommandScope, PluginMeta, StorageScope, UserRole};
pub use plugin::{BotCommand, BotPlugin};
pub use state::{PluginState, StateKey, StateStore};
