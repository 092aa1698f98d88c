use std::future::Future;
use std::sync::{Arc, RwLock};
use async_trait::async_trait;
use crate::application::errors::BotError;
use crate::application::messaging::conversation::Conversation;
use crate::application::messaging::pattern::{MatchResult, Pattern};

/// Handles a matched command
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, conversation: Conversation);
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(Conversation) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, conversation: Conversation) {
        (self)(conversation).await
    }
}

/// Represents a bot command
pub struct Command {
    pattern: Pattern,
    description: String,
    handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new<H>(pattern: &str, handler: H) -> Result<Self, BotError>
    where
        H: CommandHandler + 'static,
    {
        Ok(Self {
            pattern: Pattern::compile(pattern)?,
            description: String::new(),
            handler: Arc::new(handler),
        })
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Empty when the command should be listed without a description
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn handler(&self) -> Arc<dyn CommandHandler> {
        Arc::clone(&self.handler)
    }

    pub fn matches(&self, text: &str) -> Option<MatchResult> {
        self.pattern.matches(text)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("pattern", &self.pattern.as_str())
            .field("description", &self.description)
            .finish()
    }
}

/// Append-only, ordered command registry.
///
/// Readers take a snapshot of the entries so registration never disturbs a
/// matching pass that is already running.
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<Vec<Arc<Command>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, command: Command) -> Result<(), BotError> {
        let mut commands = self.commands.write()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?;
        tracing::debug!("Registered command: {}", command.pattern.as_str());
        commands.push(Arc::new(command));
        Ok(())
    }

    /// Commands in registration order
    pub fn snapshot(&self) -> Vec<Arc<Command>> {
        self.commands.read()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.commands.read()
            .map(|c| c.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop(_conv: Conversation) {}

    #[test]
    fn test_command_builder() {
        let cmd = Command::new("hello {name}", noop).unwrap()
            .with_description("Say hello");
        assert_eq!(cmd.pattern().as_str(), "hello {name}");
        assert_eq!(cmd.description(), "Say hello");
        assert!(cmd.matches("hello bob").is_some());
        assert!(cmd.matches("bye bob").is_none());
    }

    #[test]
    fn test_registry_keeps_order() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());

        for pattern in ["one", "two", "three"] {
            registry.register(Command::new(pattern, noop).unwrap()).unwrap();
        }

        let patterns: Vec<String> = registry.snapshot()
            .iter()
            .map(|c| c.pattern().as_str().to_string())
            .collect();
        assert_eq!(patterns, ["one", "two", "three"]);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_register() {
        let registry = CommandRegistry::new();
        registry.register(Command::new("one", noop).unwrap()).unwrap();

        let snapshot = registry.snapshot();
        registry.register(Command::new("two", noop).unwrap()).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }
}
