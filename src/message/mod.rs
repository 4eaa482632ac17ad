//! Decoded chat message model
//!
//! The wire protocol adapter (out of scope for this crate) decodes inbound
//! events into [`MessageEvent`] values and encodes outbound [`Message`]
//! values. The command dispatcher and plugin commands only ever see these
//! decoded forms.
//!
//! A message is a list of segments. Commands addressed to the bot follow the
//! "mention the bot, followed by a text segment" convention, optionally
//! preceded by a forwarded-message wrapper segment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of a decoded chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// A mention of a user.
    At { user_id: u64 },
    /// Plain text.
    Text { text: String },
    /// A merged-forward wrapper carrying the forward bundle id.
    Forward { forward_id: String },
    /// A reply reference to a prior message.
    Reply { message_id: i64 },
    /// An image attachment.
    Image { url: String },
}

/// A decoded chat message: an ordered list of segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub segments: Vec<Segment>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenated text of all text segments.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if let Segment::Text { text } = segment {
                out.push_str(text);
            }
        }
        out
    }

    /// Whitespace-token rendering of the whole message.
    ///
    /// Non-text segments render as a single token each; text segments
    /// contribute one token per whitespace-separated word. Argument parsing
    /// skips the mention/forward boilerplate tokens from this stream.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::At { user_id } => tokens.push(format!("@{user_id}")),
                Segment::Forward { forward_id } => tokens.push(format!("[forward:{forward_id}]")),
                Segment::Reply { message_id } => tokens.push(format!("[reply:{message_id}]")),
                Segment::Image { .. } => tokens.push("[image]".to_string()),
                Segment::Text { text } => {
                    tokens.extend(text.split_whitespace().map(str::to_string));
                }
            }
        }
        tokens
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens().join(" "))
    }
}

/// Fluent builder for outbound messages.
///
/// ```
/// use trellis::message::MessageBuilder;
///
/// let msg = MessageBuilder::new().at(12345).text("Command not found").build();
/// assert_eq!(msg.segments.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MessageBuilder {
    segments: Vec<Segment>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, user_id: u64) -> Self {
        self.segments.push(Segment::At { user_id });
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Text { text: text.into() });
        self
    }

    pub fn reply(mut self, message_id: i64) -> Self {
        self.segments.push(Segment::Reply { message_id });
        self
    }

    pub fn build(self) -> Message {
        Message {
            segments: self.segments,
        }
    }
}

/// The sender of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: u64,
    pub nickname: String,
}

/// A decoded inbound group-chat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub group_id: u64,
    pub message_id: i64,
    pub sender: Sender,
    pub message: Message,
}
