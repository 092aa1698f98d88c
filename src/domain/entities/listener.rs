use std::future::Future;
use std::sync::{Arc, RwLock};
use async_trait::async_trait;
use regex_lite::Regex;
use crate::application::errors::BotError;
use crate::application::messaging::conversation::ListenerConversation;

/// Handles a message heard by a listener
#[async_trait]
pub trait ListenerHandler: Send + Sync {
    async fn handle(&self, conversation: ListenerConversation);
}

#[async_trait]
impl<F, Fut> ListenerHandler for F
where
    F: Fn(ListenerConversation) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, conversation: ListenerConversation) {
        (self)(conversation).await
    }
}

/// Free-form listener: an unanchored regex over the raw message text
pub struct Listener {
    regex: Regex,
    handler: Arc<dyn ListenerHandler>,
}

impl Listener {
    pub fn new<H>(regex: &str, handler: H) -> Result<Self, BotError>
    where
        H: ListenerHandler + 'static,
    {
        let regex = Regex::new(regex)
            .map_err(|e| BotError::Pattern(format!("invalid listener regex '{}': {}", regex, e)))?;
        Ok(Self {
            regex,
            handler: Arc::new(handler),
        })
    }

    pub fn regex(&self) -> &str {
        self.regex.as_str()
    }

    pub fn handler(&self) -> Arc<dyn ListenerHandler> {
        Arc::clone(&self.handler)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

/// Append-only, ordered listener registry
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<Arc<Listener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Listener) -> Result<(), BotError> {
        let mut listeners = self.listeners.write()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?;
        tracing::debug!("Registered listener: {}", listener.regex());
        listeners.push(Arc::new(listener));
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<Arc<Listener>> {
        self.listeners.read()
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.listeners.read()
            .map(|l| l.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
