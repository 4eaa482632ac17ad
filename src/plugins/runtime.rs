//! The plugin runtime.
//!
//! Owns the registry (plugin id -> live registration), the trigger route
//! table and the shadow-copy cache. Load and unload for a given plugin id
//! are serialized through a per-id async lock; dispatch takes no lock at
//! all and reads the route table directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::dispatch::CommandContextFactory;
use crate::error::{BotError, Result};
use crate::message::MessageEvent;
use crate::sdk::{BotPlugin, PluginMeta};

use super::isolation::{IsolationHandle, LoadedModule, ModuleLoader};
use super::loading::LoadingContext;
use super::routes::RouteTable;
use super::supervisor::{run_contained, ExecuteOutcome, PluginSupervisor, SupervisorState};

struct PluginRegistration {
    supervisor: Arc<PluginSupervisor>,
    artifact_path: PathBuf,
    shadow_path: PathBuf,
}

/// Snapshot of one registered plugin for the admin listing.
#[derive(Debug, Clone)]
pub struct PluginStatus {
    pub meta: PluginMeta,
    pub state: SupervisorState,
    pub error_count: u32,
}

pub struct PluginRuntime {
    loader: Arc<dyn ModuleLoader>,
    registry: DashMap<String, PluginRegistration>,
    routes: RouteTable,
    load_locks: DashMap<String, Arc<Mutex<()>>>,
    shadow_dir: PathBuf,
    contexts: CommandContextFactory,
}

impl PluginRuntime {
    /// Create the runtime, ensuring the shadow cache directory exists.
    /// Existing shadow copies from earlier runs are left in place.
    pub fn new(
        loader: Arc<dyn ModuleLoader>,
        shadow_dir: impl Into<PathBuf>,
        contexts: CommandContextFactory,
    ) -> Result<Self> {
        let shadow_dir = shadow_dir.into();
        std::fs::create_dir_all(&shadow_dir)?;
        Ok(Self {
            loader,
            registry: DashMap::new(),
            routes: RouteTable::new(),
            load_locks: DashMap::new(),
            shadow_dir,
            contexts,
        })
    }

    /// Shadow-copy and load a plugin artifact, activating every plugin the
    /// binary registers. Returns the ids that came up; a binary exposing no
    /// plugin implementations is a load error.
    pub async fn load_plugin(&self, artifact: &Path) -> Result<Vec<String>> {
        let artifact = resolve_artifact_path(artifact)?;
        let artifact = artifact.as_path();
        let shadow = self.shadow_copy(artifact).await?;
        let module = match self.loader.load(&shadow) {
            Ok(module) => module,
            Err(e) => {
                let _ = tokio::fs::remove_file(&shadow).await;
                return Err(e);
            }
        };

        let LoadedModule { isolation, plugins } = module;
        if plugins.is_empty() {
            drop(isolation);
            let _ = tokio::fs::remove_file(&shadow).await;
            return Err(BotError::Load(format!(
                "'{}' exposes no plugin implementations",
                artifact.display()
            )));
        }

        let mut activated = Vec::new();
        for plugin in plugins {
            let id = plugin.meta().id.clone();
            match self
                .activate_single(
                    plugin,
                    Arc::clone(&isolation),
                    artifact.to_path_buf(),
                    shadow.clone(),
                )
                .await
            {
                Ok(()) => activated.push(id),
                Err(e) => error!(plugin = %id, error = %e, "plugin activation failed"),
            }
        }

        if activated.is_empty() {
            drop(isolation);
            let _ = tokio::fs::remove_file(&shadow).await;
            return Err(BotError::Load(format!(
                "no plugin from '{}' could be activated",
                artifact.display()
            )));
        }
        Ok(activated)
    }

    /// Activate one plugin instance out of a loaded binary.
    ///
    /// Order matters: the load hook runs and must succeed before any prior
    /// registration under the same id is touched, so a failed reload leaves
    /// the old version serving. Failure to delete the superseded shadow
    /// copy fails the new load, keeping one shadow file per id invariant.
    async fn activate_single(
        &self,
        plugin: Box<dyn BotPlugin>,
        isolation: Arc<IsolationHandle>,
        artifact_path: PathBuf,
        shadow_path: PathBuf,
    ) -> Result<()> {
        let meta = plugin.meta().clone();
        meta.validate()?;

        let lock = self.load_lock(&meta.id);
        let _guard = lock.lock().await;

        let loading = LoadingContext::new(&meta);
        run_contained(plugin.on_loaded(&loading))
            .await
            .map_err(|e| BotError::Load(format!("'{}' load hook failed: {e}", meta.id)))?;
        let commands = loading.into_commands();

        let supervisor = Arc::new(PluginSupervisor::new(meta.clone(), plugin, isolation));

        if let Some((_, prior)) = self.registry.remove(&meta.id) {
            info!(plugin = %meta.id, "replacing prior registration");
            self.routes.purge_plugin(&meta.id);
            prior.supervisor.unload().await;
            if prior.shadow_path != shadow_path {
                if let Err(e) = remove_shadow(&prior.shadow_path).await {
                    supervisor.unload().await;
                    return Err(BotError::Load(format!(
                        "cannot delete superseded shadow copy '{}': {e}",
                        prior.shadow_path.display()
                    )));
                }
            }
        }

        let artifact_display = artifact_path.display().to_string();
        self.registry.insert(
            meta.id.clone(),
            PluginRegistration {
                supervisor: Arc::clone(&supervisor),
                artifact_path,
                shadow_path,
            },
        );
        let command_count = commands.len();
        for command in commands {
            self.routes.register_command(&supervisor, command);
        }

        info!(
            plugin = %meta.id,
            version = %meta.version,
            commands = command_count,
            artifact = %artifact_display,
            "plugin activated"
        );
        Ok(())
    }

    /// Tear down and deregister a plugin. A no-op for unknown ids.
    pub async fn unload_plugin(&self, plugin_id: &str) -> Result<()> {
        let lock = self.load_lock(plugin_id);
        let _guard = lock.lock().await;

        let Some((_, registration)) = self.registry.remove(plugin_id) else {
            debug!(plugin = plugin_id, "unload requested for unknown plugin");
            return Ok(());
        };
        self.routes.purge_plugin(plugin_id);
        registration.supervisor.unload().await;
        if let Err(e) = remove_shadow(&registration.shadow_path).await {
            warn!(
                plugin = plugin_id,
                shadow = %registration.shadow_path.display(),
                error = %e,
                "cannot delete shadow copy"
            );
        }
        Ok(())
    }

    /// Route a recognized trigger to its owning command.
    ///
    /// Unmatched triggers get the standard "Command not found" reply. A
    /// tripped execution purges the dead plugin's registration and routes
    /// before returning.
    pub async fn dispatch_command(
        &self,
        trigger: &str,
        event: &MessageEvent,
        args: Vec<String>,
        refer_message: i64,
    ) -> Result<()> {
        let Some(entry) = self.routes.resolve(trigger) else {
            debug!(trigger, "no route for trigger");
            return self.contexts.reply_not_found(event).await;
        };

        let ctx = self.contexts.build(&entry.plugin_id, event, args, refer_message);
        let outcome = entry.supervisor.safe_execute(&entry.command, &ctx).await;
        if outcome == ExecuteOutcome::Tripped {
            self.purge_tripped(&entry.plugin_id, &entry.supervisor).await;
        }
        Ok(())
    }

    /// Remove a tripped plugin's registration and routes, but only while
    /// the registration still belongs to the supervisor that tripped. A
    /// dispatch started before a reload may trip after the reload installed
    /// a fresh registration; that replacement must survive.
    async fn purge_tripped(&self, plugin_id: &str, tripped: &Arc<PluginSupervisor>) {
        let lock = self.load_lock(plugin_id);
        let _guard = lock.lock().await;

        let is_current = self
            .registry
            .get(plugin_id)
            .map(|registration| Arc::ptr_eq(&registration.supervisor, tripped))
            .unwrap_or(false);
        if !is_current {
            debug!(plugin = plugin_id, "stale trip, registration already replaced");
            return;
        }

        let removed = self.routes.purge_plugin(plugin_id);
        if let Some((_, registration)) = self.registry.remove(plugin_id) {
            if let Err(e) = remove_shadow(&registration.shadow_path).await {
                warn!(plugin = plugin_id, error = %e, "cannot delete shadow copy");
            }
        }
        warn!(
            plugin = plugin_id,
            routes_removed = removed,
            "tripped plugin purged from registry"
        );
    }

    /// Cheap read-only lookup: the owning plugin id, if any command claims
    /// the trigger. Used before any context construction.
    pub fn try_resolve_trigger(&self, trigger: &str) -> Option<String> {
        self.routes.resolve(trigger).map(|entry| entry.plugin_id)
    }

    /// Registered plugins with their breaker state, sorted by id.
    pub fn list_active(&self) -> Vec<PluginStatus> {
        let mut statuses: Vec<PluginStatus> = self
            .registry
            .iter()
            .map(|entry| PluginStatus {
                meta: entry.value().supervisor.meta().clone(),
                state: entry.value().supervisor.state(),
                error_count: entry.value().supervisor.error_count(),
            })
            .collect();
        statuses.sort_by(|a, b| a.meta.id.cmp(&b.meta.id));
        statuses
    }

    /// Pause or resume a plugin. Id matching is case-insensitive.
    pub fn toggle_active(&self, plugin_id: &str) -> Result<SupervisorState> {
        for entry in self.registry.iter() {
            if entry.key().eq_ignore_ascii_case(plugin_id) {
                return Ok(entry.value().supervisor.toggle());
            }
        }
        Err(BotError::NotFound(format!("plugin '{plugin_id}'")))
    }

    /// Fire-and-forget load for the admin upload surface. The caller polls
    /// [`list_active`](Self::list_active) for the eventual state.
    pub fn submit_artifact(self: &Arc<Self>, artifact: PathBuf) {
        let runtime = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = runtime.load_plugin(&artifact).await {
                error!(
                    artifact = %artifact.display(),
                    error = %e,
                    "submitted artifact failed to load"
                );
            }
        });
    }

    /// Unload every registered plugin.
    pub async fn shutdown(&self) {
        let ids: Vec<String> = self.registry.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            if let Err(e) = self.unload_plugin(&id).await {
                warn!(plugin = %id, error = %e, "unload during shutdown failed");
            }
        }
    }

    /// Shadow copies currently on disk, for tests and diagnostics.
    pub fn shadow_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for dir_entry in std::fs::read_dir(&self.shadow_dir)? {
            files.push(dir_entry?.path());
        }
        Ok(files)
    }

    fn load_lock(&self, plugin_id: &str) -> Arc<Mutex<()>> {
        self.load_locks
            .entry(plugin_id.to_string())
            .or_default()
            .clone()
    }

    /// Copy the artifact into the shadow cache under a collision-free name
    /// and log its digest. The original file stays untouched and can be
    /// replaced while the copy is loaded.
    async fn shadow_copy(&self, artifact: &Path) -> Result<PathBuf> {
        let bytes = tokio::fs::read(&artifact)
            .await
            .map_err(|e| BotError::Load(format!("cannot read '{}': {e}", artifact.display())))?;
        let digest = hex::encode(Sha256::digest(&bytes));

        let stem = artifact
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("plugin");
        let name = match artifact.extension().and_then(|s| s.to_str()) {
            Some(ext) => format!("{stem}-{}.{ext}", Uuid::new_v4()),
            None => format!("{stem}-{}", Uuid::new_v4()),
        };
        let shadow = self.shadow_dir.join(name);
        tokio::fs::write(&shadow, &bytes).await?;

        info!(
            artifact = %artifact.display(),
            shadow = %shadow.display(),
            sha256 = %digest,
            "artifact shadow copied"
        );
        Ok(shadow)
    }
}

fn resolve_artifact_path(artifact: &Path) -> Result<PathBuf> {
    if artifact.is_absolute() {
        Ok(artifact.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(artifact))
    }
}

async fn remove_shadow(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::supervisor::MAX_ERRORS;
    use crate::testutil::{
        command_event, test_factory, FailingCommand, FnLoader, NoopPlugin, RecordingChatService,
        TestCommand,
    };
    use crate::sdk::{BotCommand, CommandContext};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;
    use tokio::sync::Notify;

    struct Fixture {
        runtime: Arc<PluginRuntime>,
        chat: Arc<RecordingChatService>,
        _dirs: (TempDir, TempDir),
    }

    fn fixture(loader: FnLoader) -> Fixture {
        let shadow_dir = TempDir::new().unwrap();
        let artifact_dir = TempDir::new().unwrap();
        let chat = Arc::new(RecordingChatService::new());
        let runtime = PluginRuntime::new(
            Arc::new(loader),
            shadow_dir.path(),
            test_factory(chat.clone()),
        )
        .unwrap();
        Fixture {
            runtime: Arc::new(runtime),
            chat,
            _dirs: (shadow_dir, artifact_dir),
        }
    }

    fn write_artifact(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"not a real library").unwrap();
        path
    }

    fn plugin_with(trigger: &'static str) -> FnLoader {
        FnLoader::new(move |path| {
            let plugin =
                NoopPlugin::new("test.plug").with_command(TestCommand::new(trigger));
            Ok(LoadedModule {
                isolation: Arc::new(IsolationHandle::detached(path)),
                plugins: vec![Box::new(plugin)],
            })
        })
    }

    #[tokio::test]
    async fn test_load_activates_and_routes() {
        let fx = fixture(plugin_with("ping"));
        let artifact = write_artifact(&fx._dirs.1, "plug.so");

        let ids = fx.runtime.load_plugin(&artifact).await.unwrap();
        assert_eq!(ids, vec!["test.plug"]);
        assert!(fx.runtime.try_resolve_trigger("ping").is_some());

        let statuses = fx.runtime.list_active();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].state, SupervisorState::Active);
    }

    #[tokio::test]
    async fn test_empty_binary_is_load_error() {
        let fx = fixture(FnLoader::new(|path| {
            Ok(LoadedModule {
                isolation: Arc::new(IsolationHandle::detached(path)),
                plugins: vec![],
            })
        }));
        let artifact = write_artifact(&fx._dirs.1, "empty.so");

        let result = fx.runtime.load_plugin(&artifact).await;
        assert!(matches!(result, Err(BotError::Load(_))));
        // The failed shadow copy is cleaned up.
        assert!(fx.runtime.shadow_files().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reload_keeps_single_registration_and_shadow() {
        let fx = fixture(plugin_with("ping"));
        let artifact = write_artifact(&fx._dirs.1, "plug.so");

        for _ in 0..3 {
            fx.runtime.load_plugin(&artifact).await.unwrap();
        }
        assert_eq!(fx.runtime.list_active().len(), 1);
        assert_eq!(fx.runtime.shadow_files().unwrap().len(), 1);
        assert!(fx.runtime.try_resolve_trigger("ping").is_some());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_old_version() {
        let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let calls_in_loader = calls.clone();
        let fx = fixture(FnLoader::new(move |path| {
            let first = calls_in_loader.fetch_add(1, Ordering::SeqCst) == 0;
            let plugin = if first {
                NoopPlugin::new("test.plug").with_command(TestCommand::new("ping"))
            } else {
                NoopPlugin::new("test.plug")
                    .with_command(TestCommand::new("ping"))
                    .fail_on_load()
            };
            Ok(LoadedModule {
                isolation: Arc::new(IsolationHandle::detached(path)),
                plugins: vec![Box::new(plugin)],
            })
        }));
        let artifact = write_artifact(&fx._dirs.1, "plug.so");

        fx.runtime.load_plugin(&artifact).await.unwrap();
        assert!(fx.runtime.load_plugin(&artifact).await.is_err());

        // Old version still serves.
        assert_eq!(fx.runtime.list_active().len(), 1);
        assert!(fx.runtime.try_resolve_trigger("ping").is_some());
    }

    #[tokio::test]
    async fn test_unload_is_idempotent_and_removes_routes() {
        let fx = fixture(plugin_with("ping"));
        let artifact = write_artifact(&fx._dirs.1, "plug.so");
        fx.runtime.load_plugin(&artifact).await.unwrap();

        fx.runtime.unload_plugin("test.plug").await.unwrap();
        fx.runtime.unload_plugin("test.plug").await.unwrap();

        assert!(fx.runtime.list_active().is_empty());
        assert!(fx.runtime.try_resolve_trigger("ping").is_none());
        assert!(fx.runtime.shadow_files().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_trigger_replies_not_found() {
        let fx = fixture(plugin_with("ping"));
        let event = command_event(1000, "nosuch");

        fx.runtime
            .dispatch_command("nosuch", &event, vec![], 0)
            .await
            .unwrap();

        let sent = fx.chat.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.plain_text().contains("Command not found"));
    }

    #[tokio::test]
    async fn test_breaker_purges_routes_after_threshold() {
        let fx = fixture(FnLoader::new(|path| {
            let plugin = NoopPlugin::new("test.plug").with_command(FailingCommand::new("boom"));
            Ok(LoadedModule {
                isolation: Arc::new(IsolationHandle::detached(path)),
                plugins: vec![Box::new(plugin)],
            })
        }));
        let artifact = write_artifact(&fx._dirs.1, "plug.so");
        fx.runtime.load_plugin(&artifact).await.unwrap();

        let event = command_event(1000, "boom");
        for _ in 0..MAX_ERRORS {
            fx.runtime
                .dispatch_command("boom", &event, vec![], 0)
                .await
                .unwrap();
        }

        assert!(fx.runtime.list_active().is_empty());
        assert!(fx.runtime.try_resolve_trigger("boom").is_none());

        // The next dispatch finds no route and gets the not-found reply.
        fx.runtime
            .dispatch_command("boom", &event, vec![], 0)
            .await
            .unwrap();
        let sent = fx.chat.sent();
        assert!(sent
            .last()
            .map(|(_, m)| m.plain_text().contains("Command not found"))
            .unwrap_or(false));
    }

    #[tokio::test]
    async fn test_inactive_dispatch_is_silent_noop() {
        let fx = fixture(FnLoader::new(|path| {
            let plugin = NoopPlugin::new("test.plug").with_command(FailingCommand::new("boom"));
            Ok(LoadedModule {
                isolation: Arc::new(IsolationHandle::detached(path)),
                plugins: vec![Box::new(plugin)],
            })
        }));
        let artifact = write_artifact(&fx._dirs.1, "plug.so");
        fx.runtime.load_plugin(&artifact).await.unwrap();

        fx.runtime.toggle_active("TEST.PLUG").unwrap();
        let event = command_event(1000, "boom");
        fx.runtime
            .dispatch_command("boom", &event, vec![], 0)
            .await
            .unwrap();

        // No reply, no counted fault, still registered.
        assert!(fx.chat.sent().is_empty());
        let statuses = fx.runtime.list_active();
        assert_eq!(statuses[0].error_count, 0);
        assert_eq!(statuses[0].state, SupervisorState::Inactive);
    }

    #[tokio::test]
    async fn test_toggle_back_on_restores_dispatch() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_loader = calls.clone();
        let fx = fixture(FnLoader::new(move |path| {
            let plugin = NoopPlugin::new("test.plug")
                .with_command(TestCommand::new("ping").with_calls(calls_in_loader.clone()));
            Ok(LoadedModule {
                isolation: Arc::new(IsolationHandle::detached(path)),
                plugins: vec![Box::new(plugin)],
            })
        }));
        let artifact = write_artifact(&fx._dirs.1, "plug.so");
        fx.runtime.load_plugin(&artifact).await.unwrap();
        let event = command_event(1000, "ping");

        fx.runtime.toggle_active("test.plug").unwrap();
        fx.runtime
            .dispatch_command("ping", &event, vec![], 0)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(
            fx.runtime.toggle_active("test.plug").unwrap(),
            SupervisorState::Active
        );
        fx.runtime
            .dispatch_command("ping", &event, vec![], 0)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Fails on every invocation; the invocation that reaches the breaker
    /// threshold waits on the gate before returning.
    struct GatedFailCommand {
        gate: Arc<Notify>,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl BotCommand for GatedFailCommand {
        fn trigger(&self) -> &str {
            "boom"
        }

        async fn execute(&self, _ctx: &CommandContext) -> crate::error::Result<()> {
            let count = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if count == MAX_ERRORS {
                self.gate.notified().await;
            }
            Err(BotError::Plugin("scripted command failure".to_string()))
        }
    }

    #[tokio::test]
    async fn test_stale_trip_does_not_purge_reloaded_plugin() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicU32::new(0));
        let (gate_in_loader, calls_in_loader) = (gate.clone(), calls.clone());
        let fx = fixture(FnLoader::new(move |path| {
            let plugin = NoopPlugin::new("test.plug").with_command(GatedFailCommand {
                gate: gate_in_loader.clone(),
                calls: calls_in_loader.clone(),
            });
            Ok(LoadedModule {
                isolation: Arc::new(IsolationHandle::detached(path)),
                plugins: vec![Box::new(plugin)],
            })
        }));
        let artifact = write_artifact(&fx._dirs.1, "plug.so");
        fx.runtime.load_plugin(&artifact).await.unwrap();

        let event = command_event(1000, "boom");
        for _ in 0..MAX_ERRORS - 1 {
            fx.runtime
                .dispatch_command("boom", &event, vec![], 0)
                .await
                .unwrap();
        }

        // The fault that will trip the breaker is held at the gate while a
        // reload replaces the registration underneath it.
        let runtime = fx.runtime.clone();
        let in_flight_event = event.clone();
        let in_flight = tokio::spawn(async move {
            runtime
                .dispatch_command("boom", &in_flight_event, vec![], 0)
                .await
        });
        while calls.load(Ordering::SeqCst) < MAX_ERRORS {
            tokio::task::yield_now().await;
        }

        fx.runtime.load_plugin(&artifact).await.unwrap();
        gate.notify_one();
        in_flight.await.unwrap().unwrap();

        // The stale trip must not tear down the replacement registration.
        assert_eq!(fx.runtime.list_active().len(), 1);
        assert!(fx.runtime.try_resolve_trigger("boom").is_some());
        assert_eq!(fx.runtime.shadow_files().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_unknown_plugin_is_not_found() {
        let fx = fixture(plugin_with("ping"));
        assert!(matches!(
            fx.runtime.toggle_active("nobody"),
            Err(BotError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_teardown_runs_once_even_when_it_fails() {
        let unload_count = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let count_in_loader = unload_count.clone();
        let fx = fixture(FnLoader::new(move |path| {
            let plugin = NoopPlugin::new("test.plug")
                .with_command(TestCommand::new("ping"))
                .with_unload_count(count_in_loader.clone())
                .fail_on_unload();
            Ok(LoadedModule {
                isolation: Arc::new(IsolationHandle::detached(path)),
                plugins: vec![Box::new(plugin)],
            })
        }));
        let artifact = write_artifact(&fx._dirs.1, "plug.so");
        fx.runtime.load_plugin(&artifact).await.unwrap();

        fx.runtime.unload_plugin("test.plug").await.unwrap();
        fx.runtime.unload_plugin("test.plug").await.unwrap();
        assert_eq!(unload_count.load(Ordering::SeqCst), 1);
        assert!(fx.runtime.list_active().is_empty());
    }

    #[tokio::test]
    async fn test_missing_artifact_is_load_error() {
        let fx = fixture(plugin_with("ping"));
        let result = fx
            .runtime
            .load_plugin(Path::new("/nonexistent/plug.so"))
            .await;
        assert!(matches!(result, Err(BotError::Load(_))));
    }
}
