//! Conversations - Per-invocation context handed to command and listener handlers

use std::sync::Arc;
use crate::domain::entities::Message;
use crate::domain::traits::Connection;
use crate::application::errors::BotError;
use super::classifier::mention_token;
use super::pattern::MatchResult;

/// Prefix `text` with a mention of the sender unless the message came from a direct channel
fn addressed(message: &Message, text: &str) -> String {
    if message.is_direct() {
        text.to_string()
    } else {
        format!("{}: {}", mention_token(&message.sender_id), text)
    }
}

async fn send_text(connection: &dyn Connection, message: &Message, text: String) -> Result<(), BotError> {
    let reply = message.reply_with(text);
    tracing::debug!("[{}] Reply {} to {}: {}", reply.channel_id, reply.id, message.id, reply.text());
    connection.send(&reply).await
}

/// Context for a matched command
pub struct Conversation {
    message: Message,
    matched: MatchResult,
    connection: Arc<dyn Connection>,
}

impl Conversation {
    pub fn new(matched: MatchResult, message: Message, connection: Arc<dyn Connection>) -> Self {
        Self {
            message,
            matched,
            connection,
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn params(&self) -> &MatchResult {
        &self.matched
    }

    /// Captured value for a `{name}` placeholder
    pub fn param(&self, name: &str) -> Option<&str> {
        self.matched.get(name)
    }

    pub fn integer(&self, name: &str) -> Result<i64, BotError> {
        let value = self.param(name)
            .ok_or_else(|| BotError::Parse(format!("missing parameter '{}'", name)))?;
        value.parse()
            .map_err(|_| BotError::Parse(format!("parameter '{}' is not an integer: {}", name, value)))
    }

    /// Reply to the sender, mentioning them outside direct channels
    pub async fn reply(&self, text: impl AsRef<str>) -> Result<(), BotError> {
        let text = addressed(&self.message, text.as_ref());
        send_text(self.connection.as_ref(), &self.message, text).await
    }

    /// Post to the originating channel without a mention
    pub async fn say(&self, text: impl Into<String>) -> Result<(), BotError> {
        send_text(self.connection.as_ref(), &self.message, text.into()).await
    }
}

/// Context for a listener hit. Listeners capture no parameters.
pub struct ListenerConversation {
    message: Message,
    connection: Arc<dyn Connection>,
}

impl ListenerConversation {
    pub fn new(message: Message, connection: Arc<dyn Connection>) -> Self {
        Self { message, connection }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub async fn reply(&self, text: impl AsRef<str>) -> Result<(), BotError> {
        let text = addressed(&self.message, text.as_ref());
        send_text(self.connection.as_ref(), &self.message, text).await
    }

    pub async fn say(&self, text: impl Into<String>) -> Result<(), BotError> {
        send_text(self.connection.as_ref(), &self.message, text.into()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::messaging::pattern::Pattern;
    use crate::domain::entities::ChannelKind;
    use crate::infrastructure::adapters::memory::MemoryConnection;

    fn conversation(msg: Message, connection: Arc<MemoryConnection>) -> Conversation {
        let matched = Pattern::compile("add {a} {b}").unwrap()
            .matches(msg.text())
            .unwrap();
        Conversation::new(matched, msg, connection)
    }

    #[tokio::test]
    async fn test_reply_mentions_sender_in_channel() {
        let connection = Arc::new(MemoryConnection::new());
        let conv = conversation(Message::new("C1", "U2", "add 1 2"), connection.clone());

        conv.reply("3").await.unwrap();

        let sent = connection.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text(), "<@U2>: 3");
        assert_eq!(sent[0].channel_id, "C1");
    }

    #[tokio::test]
    async fn test_reply_in_direct_channel_has_no_mention() {
        let connection = Arc::new(MemoryConnection::new());
        let msg = Message::new("D1", "U2", "add 1 2").with_channel_kind(ChannelKind::Direct);
        let conv = conversation(msg, connection.clone());

        conv.reply("3").await.unwrap();
        conv.say("done").await.unwrap();

        let texts: Vec<String> = connection.sent().iter().map(|m| m.text().to_string()).collect();
        assert_eq!(texts, ["3", "done"]);
    }

    #[test]
    fn test_integer_params() {
        let connection = Arc::new(MemoryConnection::new());
        let conv = conversation(Message::new("C1", "U2", "add 40 two"), connection);

        assert_eq!(conv.integer("a").unwrap(), 40);
        assert!(matches!(conv.integer("b"), Err(BotError::Parse(_))));
        assert!(matches!(conv.integer("c"), Err(BotError::Parse(_))));
        assert_eq!(conv.param("b"), Some("two"));
    }

    #[tokio::test]
    async fn test_listener_say() {
        let connection = Arc::new(MemoryConnection::new());
        let conv = ListenerConversation::new(Message::new("C1", "U2", "thanks"), connection.clone());

        conv.say("you're welcome").await.unwrap();

        assert_eq!(connection.sent()[0].text(), "you're welcome");
    }

    #[tokio::test]
    async fn test_each_reply_is_a_new_message() {
        let connection = Arc::new(MemoryConnection::new());
        let inbound = Message::new("C1", "U2", "thanks");
        let inbound_id = inbound.id.clone();
        let conv = ListenerConversation::new(inbound, connection.clone());

        conv.say("one").await.unwrap();
        conv.say("two").await.unwrap();

        let sent = connection.sent();
        assert_ne!(sent[0].id, inbound_id);
        assert_ne!(sent[0].id, sent[1].id);
        assert_eq!(sent[1].channel_id, "C1");
    }
}
