//! Shared test doubles: scripted plugins, counting commands and a recording
//! chat service. Compiled for tests only.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::channels::{ChatService, MemberInfo, NullArchiveService, NullAuditService};
use crate::dispatch::CommandContextFactory;
use crate::error::{BotError, Result};
use crate::message::{Message, MessageEvent, Segment, Sender};
use crate::plugins::isolation::{LoadedModule, ModuleLoader};
use crate::plugins::LoadingContext;
use crate::sdk::{BotCommand, BotPlugin, CommandContext, PluginMeta};
use crate::state::MemoryStateStore;

pub fn test_meta(id: &str) -> PluginMeta {
    PluginMeta {
        id: id.to_string(),
        name: "Test Plugin".to_string(),
        version: "1.0.0".to_string(),
        author: "tester".to_string(),
        description: "scripted test plugin".to_string(),
    }
}

/// Scripted plugin: registers its configured commands on load and counts
/// teardown invocations.
pub struct NoopPlugin {
    meta: PluginMeta,
    commands: Vec<Arc<dyn BotCommand>>,
    unload_count: Arc<AtomicU32>,
    fail_on_load: bool,
    fail_on_unload: bool,
}

impl NoopPlugin {
    pub fn new(id: &str) -> Self {
        Self {
            meta: test_meta(id),
            commands: Vec::new(),
            unload_count: Arc::new(AtomicU32::new(0)),
            fail_on_load: false,
            fail_on_unload: false,
        }
    }

    pub fn with_command<C: BotCommand + 'static>(mut self, command: C) -> Self {
        self.commands.push(Arc::new(command));
        self
    }

    pub fn with_unload_count(mut self, count: Arc<AtomicU32>) -> Self {
        self.unload_count = count;
        self
    }

    pub fn fail_on_load(mut self) -> Self {
        self.fail_on_load = true;
        self
    }

    pub fn fail_on_unload(mut self) -> Self {
        self.fail_on_unload = true;
        self
    }

    pub fn unload_count(&self) -> Arc<AtomicU32> {
        self.unload_count.clone()
    }
}

#[async_trait]
impl BotPlugin for NoopPlugin {
    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    async fn on_loaded(&self, ctx: &LoadingContext) -> Result<()> {
        if self.fail_on_load {
            return Err(BotError::Plugin("scripted load failure".to_string()));
        }
        for command in &self.commands {
            ctx.register_command(command.clone());
        }
        Ok(())
    }

    async fn on_unloaded(&self) -> Result<()> {
        self.unload_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_unload {
            return Err(BotError::Plugin("scripted teardown failure".to_string()));
        }
        Ok(())
    }
}

/// Command that succeeds and counts invocations.
pub struct TestCommand {
    trigger: String,
    aliases: Vec<String>,
    calls: Arc<AtomicU32>,
}

impl TestCommand {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            aliases: Vec::new(),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_calls(mut self, calls: Arc<AtomicU32>) -> Self {
        self.calls = calls;
        self
    }
}

#[async_trait]
impl BotCommand for TestCommand {
    fn trigger(&self) -> &str {
        &self.trigger
    }

    fn aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }

    async fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Command that always returns an error.
pub struct FailingCommand {
    trigger: String,
}

impl FailingCommand {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
        }
    }
}

#[async_trait]
impl BotCommand for FailingCommand {
    fn trigger(&self) -> &str {
        &self.trigger
    }

    async fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        Err(BotError::Plugin("scripted command failure".to_string()))
    }
}

/// Command that always panics.
pub struct PanickingCommand {
    trigger: String,
}

impl PanickingCommand {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
        }
    }
}

#[async_trait]
impl BotCommand for PanickingCommand {
    fn trigger(&self) -> &str {
        &self.trigger
    }

    async fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        panic!("scripted command panic");
    }
}

/// In-process module loader driven by a closure.
pub struct FnLoader {
    load_fn: Box<dyn Fn(&Path) -> Result<LoadedModule> + Send + Sync>,
}

impl FnLoader {
    pub fn new<F>(load_fn: F) -> Self
    where
        F: Fn(&Path) -> Result<LoadedModule> + Send + Sync + 'static,
    {
        Self {
            load_fn: Box::new(load_fn),
        }
    }
}

impl ModuleLoader for FnLoader {
    fn load(&self, path: &Path) -> Result<LoadedModule> {
        (self.load_fn)(path)
    }
}

/// Chat service that records outbound group messages.
#[derive(Default)]
pub struct RecordingChatService {
    sent: Mutex<Vec<(u64, Message)>>,
}

impl RecordingChatService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(u64, Message)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatService for RecordingChatService {
    async fn send_group_message(&self, group_id: u64, message: Message) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((group_id, message));
        }
        Ok(())
    }

    async fn group_member_info(
        &self,
        _group_id: u64,
        _member_id: u64,
    ) -> Result<Option<MemberInfo>> {
        Ok(None)
    }

    async fn group_member_list(&self, _group_id: u64) -> Result<Vec<MemberInfo>> {
        Ok(Vec::new())
    }

    async fn withdraw_message(&self, _message_id: i64) -> Result<()> {
        Ok(())
    }

    async fn kick_member(
        &self,
        _group_id: u64,
        _member_id: u64,
        _reject_request: bool,
    ) -> Result<()> {
        Ok(())
    }

    async fn forward_messages(&self, _forward_id: &str) -> Result<Vec<Message>> {
        Ok(Vec::new())
    }
}

/// Context factory wired with test doubles.
pub fn test_factory(chat: Arc<RecordingChatService>) -> CommandContextFactory {
    CommandContextFactory::new(
        chat,
        Arc::new(NullArchiveService),
        Arc::new(NullAuditService),
        Arc::new(MemoryStateStore::new()),
    )
}

/// A minimal inbound command event addressed to `bot_id`.
pub fn command_event(bot_id: u64, trigger: &str) -> MessageEvent {
    MessageEvent {
        group_id: 100,
        message_id: 555,
        sender: Sender {
            id: 7,
            nickname: "alice".to_string(),
        },
        message: Message {
            segments: vec![
                Segment::At { user_id: bot_id },
                Segment::Text {
                    text: trigger.to_string(),
                },
            ],
        },
    }
}

/// A ready-made invocation context bound to `plugin_id`.
pub fn command_context(plugin_id: &str) -> CommandContext {
    let chat = Arc::new(RecordingChatService::new());
    test_factory(chat).build(plugin_id, &command_event(1000, "test"), Vec::new(), 0)
}
