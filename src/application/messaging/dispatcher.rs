//! Message dispatcher - Routes messages to commands and listeners

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use crate::domain::entities::{
    Command, CommandHandler, CommandRegistry, Listener, ListenerHandler, ListenerRegistry, Message,
};
use crate::domain::traits::{Connection, Spawner};
use crate::application::errors::BotError;
use super::conversation::{Conversation, ListenerConversation};
use super::help::help_text;

/// Default command prefix
pub const DEFAULT_PREFIX: &str = "!";

/// Observer for inbound frames that could not be decoded
pub type FrameErrorObserver = Arc<dyn Fn(&BotError) + Send + Sync>;

struct Inner {
    id: String,
    prefix: RwLock<String>,
    ignore_own: AtomicBool,
    commands: CommandRegistry,
    listeners: ListenerRegistry,
    connection: Arc<dyn Connection>,
    spawner: Arc<dyn Spawner>,
    frame_observer: RwLock<Option<FrameErrorObserver>>,
}

/// The bot: owns the registries and the connection and dispatches every
/// inbound message to matching commands and listeners.
///
/// Cloning is cheap and clones share the same state.
#[derive(Clone)]
pub struct Bot {
    inner: Arc<Inner>,
}

impl Bot {
    /// Build a bot on an already open connection. `id` is the bot's own user id.
    pub fn with_connection(
        id: impl Into<String>,
        connection: Arc<dyn Connection>,
        spawner: Arc<dyn Spawner>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: id.into(),
                prefix: RwLock::new(DEFAULT_PREFIX.to_string()),
                ignore_own: AtomicBool::new(false),
                commands: CommandRegistry::new(),
                listeners: ListenerRegistry::new(),
                connection,
                spawner,
                frame_observer: RwLock::new(None),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn prefix(&self) -> String {
        self.inner.prefix.read()
            .map(|p| p.clone())
            .unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        if let Ok(mut current) = self.inner.prefix.write() {
            *current = prefix.into();
        }
    }

    /// Drop messages authored by the bot itself before classification. Off by default.
    pub fn ignore_own_messages(&self, ignore: bool) {
        self.inner.ignore_own.store(ignore, Ordering::Relaxed);
    }

    pub fn ignores_own_messages(&self) -> bool {
        self.inner.ignore_own.load(Ordering::Relaxed)
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.inner.commands
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.inner.listeners
    }

    /// Register a command with an empty description
    pub fn command<H>(&self, pattern: &str, handler: H) -> Result<(), BotError>
    where
        H: CommandHandler + 'static,
    {
        self.register_command(Command::new(pattern, handler)?)
    }

    /// Register a listener for an unanchored regex
    pub fn hear<H>(&self, regex: &str, handler: H) -> Result<(), BotError>
    where
        H: ListenerHandler + 'static,
    {
        self.register_listener(Listener::new(regex, handler)?)
    }

    pub fn register_command(&self, command: Command) -> Result<(), BotError> {
        self.inner.commands.register(command)
    }

    pub fn register_listener(&self, listener: Listener) -> Result<(), BotError> {
        self.inner.listeners.register(listener)
    }

    /// Observe inbound frames that were skipped because they could not be decoded
    pub fn on_frame_error<F>(&self, observer: F)
    where
        F: Fn(&BotError) + Send + Sync + 'static,
    {
        if let Ok(mut current) = self.inner.frame_observer.write() {
            *current = Some(Arc::new(observer));
        }
    }

    /// Run the receive loop until the connection ends.
    ///
    /// Each decoded message is processed as a detached task so the next
    /// receive is never held up by matching or handlers.
    pub async fn listen(&self) {
        tracing::info!("Listening for messages as {}", self.id());

        while let Some(frame) = self.inner.connection.receive().await {
            match frame {
                Ok(message) => {
                    let bot = self.clone();
                    self.inner.spawner.spawn(Box::pin(async move {
                        bot.process(message).await;
                    }));
                }
                Err(e) => {
                    tracing::debug!("Skipping malformed frame: {}", e);
                    let observer = self.inner.frame_observer.read()
                        .ok()
                        .and_then(|o| o.clone());
                    if let Some(observer) = observer {
                        observer(&e);
                    }
                }
            }
        }

        tracing::info!("Connection closed, stopped listening");
    }

    /// Classify one message and run the help, command and listener passes
    pub async fn process(&self, mut message: Message) {
        let id = self.id();
        if self.ignores_own_messages() && message.is_from(id) {
            tracing::debug!("[{}] Ignoring own message {}", message.channel_id, message.id);
            return;
        }

        tracing::debug!(
            "[{}] {} message {} from {}",
            message.channel_id,
            message.channel_kind.as_str(),
            message.id,
            message.sender_id
        );

        let prefix = self.prefix();
        if message.is_bot_message(&prefix, id) {
            message.normalize(&prefix, id);
            tracing::debug!("[{}] Addressed {}: {}", message.channel_id, message.id, message.text());

            if message.is_help_request() {
                self.send_help(&message).await;
                return;
            }
            if self.search_command(&message) {
                return;
            }
        }

        self.search_listener(&message);
    }

    /// Schedule every command whose pattern matches the derived text.
    /// Returns true if at least one matched.
    pub fn search_command(&self, message: &Message) -> bool {
        let mut matched_any = false;

        for cmd in self.inner.commands.snapshot() {
            let Some(matched) = cmd.matches(message.text()) else {
                continue;
            };
            tracing::debug!(
                "[{}] Command matched for {}: {} ({}ms after receipt)",
                message.channel_id,
                message.id,
                cmd.pattern().as_str(),
                message.age().num_milliseconds()
            );

            let conversation = Conversation::new(matched, message.clone(), Arc::clone(&self.inner.connection));
            let handler = cmd.handler();
            self.inner.spawner.spawn(Box::pin(async move {
                handler.handle(conversation).await;
            }));
            matched_any = true;
        }

        matched_any
    }

    /// Schedule every listener whose regex matches the raw text.
    /// Returns true if at least one matched.
    pub fn search_listener(&self, message: &Message) -> bool {
        let mut matched_any = false;

        for listener in self.inner.listeners.snapshot() {
            if !listener.is_match(&message.raw_text) {
                continue;
            }
            tracing::debug!(
                "[{}] Listener matched for {}: {} ({}ms after receipt)",
                message.channel_id,
                message.id,
                listener.regex(),
                message.age().num_milliseconds()
            );

            let conversation = ListenerConversation::new(message.clone(), Arc::clone(&self.inner.connection));
            let handler = listener.handler();
            self.inner.spawner.spawn(Box::pin(async move {
                handler.handle(conversation).await;
            }));
            matched_any = true;
        }

        matched_any
    }

    /// Reply with the list of registered commands
    pub async fn send_help(&self, message: &Message) {
        let help = help_text(&self.inner.commands.snapshot(), message);
        let reply = message.reply_with(help);

        if let Err(e) = self.inner.connection.send(&reply).await {
            tracing::warn!("[{}] Failed to send help: {}", message.channel_id, e);
        }
    }
}
