//! Loading context passed to a plugin's load hook.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::sdk::{BotCommand, PluginMeta};

/// Handed to [`BotPlugin::on_loaded`]; the only place commands can be
/// registered. After the hook returns the context is drained and the
/// registered set becomes immutable for the plugin's lifetime.
///
/// [`BotPlugin::on_loaded`]: crate::sdk::BotPlugin::on_loaded
pub struct LoadingContext {
    plugin_id: String,
    commands: Mutex<Vec<Arc<dyn BotCommand>>>,
}

impl LoadingContext {
    pub(crate) fn new(meta: &PluginMeta) -> Self {
        Self {
            plugin_id: meta.id.clone(),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Id of the plugin being loaded.
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// A tracing span scoped to this plugin, for the plugin's own logging
    /// during and after load.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("plugin", id = %self.plugin_id)
    }

    /// Register a command owned by this plugin.
    pub fn register_command(&self, command: Arc<dyn BotCommand>) {
        debug!(
            plugin = %self.plugin_id,
            trigger = command.trigger(),
            "command registered during load"
        );
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }
    }

    /// Snapshot of the commands registered so far.
    pub fn registered_commands(&self) -> Vec<Arc<dyn BotCommand>> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    pub(crate) fn into_commands(self) -> Vec<Arc<dyn BotCommand>> {
        self.commands
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
