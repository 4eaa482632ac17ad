//! Trigger routing table.
//!
//! Maps each trigger word (and alias) to the supervisor and command that
//! own it. First registrant wins a trigger; later claims are logged and
//! skipped, and an alias never gets promoted when the owner of the primary
//! trigger goes away.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::sdk::BotCommand;

use super::isolation::IsolationHandle;
use super::supervisor::PluginSupervisor;

/// One installed route. Co-owns the isolation handle so the command vtable
/// stays mapped for as long as this entry is reachable.
#[derive(Clone)]
pub struct RouteEntry {
    pub plugin_id: String,
    pub supervisor: Arc<PluginSupervisor>,
    pub command: Arc<dyn BotCommand>,
    _isolation: Arc<IsolationHandle>,
}

/// Concurrent trigger -> route map.
#[derive(Default)]
pub struct RouteTable {
    routes: DashMap<String, RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the command's primary trigger and every alias, first
    /// registrant wins each.
    pub fn register_command(&self, supervisor: &Arc<PluginSupervisor>, command: Arc<dyn BotCommand>) {
        self.try_claim(command.trigger().to_string(), supervisor, &command);
        for alias in command.aliases() {
            self.try_claim(alias, supervisor, &command);
        }
    }

    fn try_claim(
        &self,
        trigger: String,
        supervisor: &Arc<PluginSupervisor>,
        command: &Arc<dyn BotCommand>,
    ) {
        match self.routes.entry(trigger) {
            Entry::Vacant(vacant) => {
                debug!(
                    plugin = %supervisor.meta().id,
                    trigger = %vacant.key(),
                    "trigger route installed"
                );
                vacant.insert(RouteEntry {
                    plugin_id: supervisor.meta().id.clone(),
                    supervisor: Arc::clone(supervisor),
                    command: Arc::clone(command),
                    _isolation: Arc::clone(supervisor.isolation()),
                });
            }
            Entry::Occupied(occupied) => {
                warn!(
                    plugin = %supervisor.meta().id,
                    trigger = %occupied.key(),
                    owner = %occupied.get().plugin_id,
                    "trigger already claimed, registration skipped"
                );
            }
        }
    }

    pub fn resolve(&self, trigger: &str) -> Option<RouteEntry> {
        self.routes.get(trigger).map(|entry| entry.value().clone())
    }

    /// Drop every route owned by the plugin. Returns how many were removed.
    pub fn purge_plugin(&self, plugin_id: &str) -> usize {
        let before = self.routes.len();
        self.routes.retain(|_, entry| entry.plugin_id != plugin_id);
        before - self.routes.len()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
