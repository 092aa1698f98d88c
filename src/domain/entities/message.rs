use chrono::{DateTime, Utc};

/// Kind of channel a message was posted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// One-to-one conversation with the bot
    Direct,
    /// Shared channel or group
    Channel,
}

impl ChannelKind {
    pub fn as_str(&self) -> &str {
        match self {
            ChannelKind::Direct => "direct",
            ChannelKind::Channel => "channel",
        }
    }
}

/// Represents an incoming or outgoing message.
///
/// `raw_text` is the text exactly as received. `text` starts as a copy of it
/// and is progressively stripped during classification.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub sender_id: String,
    pub channel_kind: ChannelKind,
    pub raw_text: String,
    text: String,
    pub timestamp: DateTime<Utc>,
    pub raw: Option<serde_json::Value>,
}

impl Message {
    pub fn new(
        channel_id: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let raw_text = text.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: channel_id.into(),
            sender_id: sender_id.into(),
            channel_kind: ChannelKind::Channel,
            text: raw_text.clone(),
            raw_text,
            timestamp: Utc::now(),
            raw: None,
        }
    }

    pub fn with_channel_kind(mut self, kind: ChannelKind) -> Self {
        self.channel_kind = kind;
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Derived text used for addressing, help and command evaluation
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Overwrite the derived text, e.g. when turning an inbound message into a reply
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_direct(&self) -> bool {
        self.channel_kind == ChannelKind::Direct
    }

    /// Build an outbound message routed back to the same channel.
    /// The reply gets its own id and timestamp.
    pub fn reply_with(&self, text: impl Into<String>) -> Self {
        let mut reply = self.clone();
        reply.id = uuid::Uuid::new_v4().to_string();
        reply.timestamp = Utc::now();
        reply.set_text(text);
        reply
    }

    /// Time elapsed since the message was created
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.timestamp
    }
}
