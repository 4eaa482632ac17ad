//! Inbound event dispatch.
//!
//! Recognizes the "mention the bot, then a trigger word" command shape,
//! tokenizes arguments and hands the invocation to the plugin runtime. An
//! optional leading merged-forward wrapper shifts every position by one and
//! supplies the referenced-message id.

mod bot_api;
mod context;

pub use bot_api::BotApiImpl;
pub use context::CommandContextFactory;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::Result;
use crate::message::{Message, MessageEvent, Segment};
use crate::plugins::PluginRuntime;

use self::context::{invocation_args, refer_message_id};

/// Thin parsing layer between decoded inbound events and the runtime.
pub struct CommandExecutor {
    runtime: Arc<PluginRuntime>,
    bot_id: u64,
}

impl CommandExecutor {
    pub fn new(runtime: Arc<PluginRuntime>, bot_id: u64) -> Self {
        Self { runtime, bot_id }
    }

    /// Handle one inbound group message. Messages that are not commands
    /// addressed to this bot are ignored without reply.
    pub async fn handle_event(&self, event: &MessageEvent) -> Result<()> {
        let Some(trigger) = self.extract_trigger(&event.message) else {
            trace!(
                group = event.group_id,
                message_id = event.message_id,
                "message is not in command format"
            );
            return Ok(());
        };

        debug!(
            group = event.group_id,
            sender = event.sender.id,
            trigger = %trigger,
            "matching trigger"
        );
        let args = invocation_args(&event.message);
        let refer = refer_message_id(&event.message);
        self.runtime
            .dispatch_command(&trigger, event, args, refer)
            .await
    }

    /// The trigger word, if the message follows the command shape: an
    /// optional forward wrapper, a mention of this bot, then text whose
    /// first word is the trigger.
    fn extract_trigger(&self, message: &Message) -> Option<String> {
        let segments = &message.segments;
        let offset = usize::from(matches!(segments.first(), Some(Segment::Forward { .. })));

        match (segments.get(offset), segments.get(offset + 1)) {
            (Some(Segment::At { user_id }), Some(Segment::Text { text }))
                if *user_id == self.bot_id =>
            {
                text.split_whitespace().next().map(str::to_string)
            }
            _ => None,
        }
    }
}
