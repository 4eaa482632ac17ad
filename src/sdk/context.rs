//! Per-invocation command context.

use std::sync::Arc;

use crate::channels::ChatService;
use crate::error::Result;
use crate::message::Message;

use super::bot_api::BotApi;
use super::state::PluginState;

/// Everything a command body sees about one dispatch.
///
/// Created fresh per dispatch and exclusively owned by that invocation;
/// nothing in here is shared with concurrent dispatches.
pub struct CommandContext {
    pub sender_id: u64,
    pub sender_name: String,
    pub group_id: u64,
    pub message_id: i64,
    /// The full decoded inbound message.
    pub raw_message: Message,
    /// Referenced forwarded-message id; 0 when the message carries none.
    pub refer_message: i64,
    /// Whitespace-tokenized arguments, mention/trigger boilerplate removed.
    pub args: Vec<String>,
    /// Scoped state accessor, already keyed by the owning plugin's id.
    pub state: PluginState,
    /// Curated host capability facade; the only way a command reaches
    /// outside its own invocation.
    pub bot_api: Arc<dyn BotApi>,
    pub(crate) chat: Arc<dyn ChatService>,
}

impl CommandContext {
    /// Reply into the originating group.
    pub async fn reply(&self, message: Message) -> Result<()> {
        self.chat.send_group_message(self.group_id, message).await
    }
}
