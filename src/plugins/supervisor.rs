//! Per-plugin fault supervision.
//!
//! Every activated plugin runs behind a [`PluginSupervisor`] that counts
//! faults over the plugin's whole lifetime and trips a circuit breaker at
//! [`MAX_ERRORS`]. A tripped plugin is torn down and its registration is
//! purged by the runtime; recovery is an explicit reload.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::sdk::{BotCommand, BotPlugin, CommandContext, PluginMeta};

use super::isolation::IsolationHandle;

/// Faults tolerated before the breaker trips. The counter never resets,
/// so a plugin gets five faults total, not five per window.
pub const MAX_ERRORS: u32 = 5;

/// Lifecycle state of a supervised plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SupervisorState {
    /// Loaded and receiving dispatches.
    Active = 0,
    /// Loaded but administratively paused; dispatches are silent no-ops.
    Inactive = 1,
    /// Breaker tripped or unloaded. Terminal.
    Dead = 2,
}

impl SupervisorState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => SupervisorState::Active,
            1 => SupervisorState::Inactive,
            _ => SupervisorState::Dead,
        }
    }

    /// The state an administrative toggle moves to. Dead is terminal.
    pub fn toggled(self) -> Self {
        match self {
            SupervisorState::Active => SupervisorState::Inactive,
            SupervisorState::Inactive => SupervisorState::Active,
            SupervisorState::Dead => SupervisorState::Dead,
        }
    }
}

/// What a supervised execution amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// The command body ran to completion.
    Completed,
    /// The plugin was not active; nothing ran.
    Skipped,
    /// The body returned an error or panicked; counted, breaker still closed.
    Faulted,
    /// This fault reached the threshold; the plugin has been torn down and
    /// the caller must purge its registration.
    Tripped,
}

/// Wraps one live plugin instance with its breaker state.
///
/// Field order matters in `Drop`: the plugin instance must drop before the
/// isolation handle it was loaded from.
pub struct PluginSupervisor {
    meta: PluginMeta,
    plugin: Mutex<Option<Box<dyn BotPlugin>>>,
    isolation: Arc<IsolationHandle>,
    state: AtomicU8,
    error_count: AtomicU32,
}

impl PluginSupervisor {
    pub fn new(
        meta: PluginMeta,
        plugin: Box<dyn BotPlugin>,
        isolation: Arc<IsolationHandle>,
    ) -> Self {
        Self {
            meta,
            plugin: Mutex::new(Some(plugin)),
            isolation,
            state: AtomicU8::new(SupervisorState::Active as u8),
            error_count: AtomicU32::new(0),
        }
    }

    pub fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    pub fn isolation(&self) -> &Arc<IsolationHandle> {
        &self.isolation
    }

    pub fn state(&self) -> SupervisorState {
        SupervisorState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn error_count(&self) -> u32 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Flip Active <-> Inactive. Returns the resulting state; a Dead plugin
    /// stays Dead.
    pub fn toggle(&self) -> SupervisorState {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let next = SupervisorState::from_u8(current).toggled();
            match self.state.compare_exchange_weak(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    info!(plugin = %self.meta.id, state = ?next, "plugin state toggled");
                    return next;
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// Run a command body under the breaker.
    ///
    /// Both `Err` returns and panics count as one fault. The fault that
    /// reaches [`MAX_ERRORS`] trips the breaker: the plugin is torn down
    /// here and [`ExecuteOutcome::Tripped`] tells the caller to purge the
    /// registration.
    pub async fn safe_execute(
        &self,
        command: &Arc<dyn BotCommand>,
        ctx: &CommandContext,
    ) -> ExecuteOutcome {
        if self.state() != SupervisorState::Active {
            return ExecuteOutcome::Skipped;
        }

        let result = AssertUnwindSafe(command.execute(ctx)).catch_unwind().await;
        let fault = match result {
            Ok(Ok(())) => return ExecuteOutcome::Completed,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic_message(panic),
        };

        self.handle_fault(command.trigger(), &fault).await
    }

    async fn handle_fault(&self, trigger: &str, fault: &str) -> ExecuteOutcome {
        let count = self.error_count.fetch_add(1, Ordering::AcqRel) + 1;
        error!(
            plugin = %self.meta.id,
            trigger,
            fault,
            error_count = count,
            "plugin command faulted"
        );

        if count < MAX_ERRORS {
            return ExecuteOutcome::Faulted;
        }

        warn!(
            plugin = %self.meta.id,
            error_count = count,
            "error threshold reached, unloading plugin"
        );
        self.unload().await;
        ExecuteOutcome::Tripped
    }

    /// Tear the plugin down. Idempotent; the teardown hook runs at most
    /// once. A failing or panicking hook is logged and swallowed, the
    /// isolation context is released either way once the last owner drops.
    pub async fn unload(&self) {
        self.state
            .store(SupervisorState::Dead as u8, Ordering::Release);

        let plugin = { self.plugin.lock().await.take() };
        let Some(plugin) = plugin else {
            return;
        };

        match AssertUnwindSafe(plugin.on_unloaded()).catch_unwind().await {
            Ok(Ok(())) => info!(plugin = %self.meta.id, "plugin unloaded"),
            Ok(Err(e)) => {
                warn!(plugin = %self.meta.id, error = %e, "plugin teardown hook failed")
            }
            Err(panic) => {
                warn!(
                    plugin = %self.meta.id,
                    fault = panic_message(panic),
                    "plugin teardown hook panicked"
                )
            }
        }
        // Dropping the boxed instance here, while `self.isolation` is still
        // held, keeps code mapped until all owners are gone.
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Convenience used by runtime code paths that run plugin lifecycle hooks.
pub(crate) async fn run_contained<F>(future: F) -> Result<()>
where
    F: std::future::Future<Output = Result<()>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(crate::error::BotError::Plugin(panic_message(panic))),
    }
}
