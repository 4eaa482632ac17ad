//! Invocation context construction.

use std::sync::Arc;

use crate::channels::{ArchiveService, AuditService, ChatService};
use crate::error::Result;
use crate::message::{Message, MessageBuilder, MessageEvent, Segment};
use crate::sdk::{CommandContext, PluginState, StateStore};

use super::bot_api::BotApiImpl;

/// Builds the per-invocation [`CommandContext`] once the owning plugin is
/// known, binding the capability facade to the event's group and sender.
pub struct CommandContextFactory {
    chat: Arc<dyn ChatService>,
    archive: Arc<dyn ArchiveService>,
    audit: Arc<dyn AuditService>,
    store: Arc<dyn StateStore>,
}

impl CommandContextFactory {
    pub fn new(
        chat: Arc<dyn ChatService>,
        archive: Arc<dyn ArchiveService>,
        audit: Arc<dyn AuditService>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            chat,
            archive,
            audit,
            store,
        }
    }

    pub fn build(
        &self,
        plugin_id: &str,
        event: &MessageEvent,
        args: Vec<String>,
        refer_message: i64,
    ) -> CommandContext {
        let bot_api = BotApiImpl::new(
            Arc::clone(&self.chat),
            Arc::clone(&self.archive),
            Arc::clone(&self.audit),
            event.group_id,
            event.sender.id,
        );
        CommandContext {
            sender_id: event.sender.id,
            sender_name: event.sender.nickname.clone(),
            group_id: event.group_id,
            message_id: event.message_id,
            raw_message: event.message.clone(),
            refer_message,
            args,
            state: PluginState::new(plugin_id, Arc::clone(&self.store)),
            bot_api: Arc::new(bot_api),
            chat: Arc::clone(&self.chat),
        }
    }

    /// Standard reply for a trigger nobody owns.
    pub async fn reply_not_found(&self, event: &MessageEvent) -> Result<()> {
        let reply = MessageBuilder::new()
            .at(event.sender.id)
            .text(" Command not found")
            .build();
        self.chat.send_group_message(event.group_id, reply).await
    }
}

/// Arguments of an invocation: the token stream minus the mention/trigger
/// boilerplate. A leading forward wrapper shifts the boilerplate by one.
pub(crate) fn invocation_args(message: &Message) -> Vec<String> {
    let skip = if matches!(message.segments.first(), Some(Segment::Forward { .. })) {
        3
    } else {
        2
    };
    message.tokens().into_iter().skip(skip).collect()
}

/// Referenced-message id: the leading forward wrapper's id when present,
/// otherwise the id of a reply/quote segment. 0 when the message carries
/// neither or the forward id is not numeric.
pub(crate) fn refer_message_id(message: &Message) -> i64 {
    if let Some(Segment::Forward { forward_id }) = message.segments.first() {
        return forward_id.parse().unwrap_or(0);
    }
    message
        .segments
        .iter()
        .find_map(|segment| match segment {
            Segment::Reply { message_id } => Some(*message_id),
            _ => None,
        })
        .unwrap_or(0)
}
