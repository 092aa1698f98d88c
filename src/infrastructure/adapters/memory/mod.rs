//! In-memory connection for tests and embedding

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use crate::domain::entities::Message;
use crate::domain::traits::Connection;
use crate::application::errors::BotError;

/// Connection backed by a scripted inbound queue.
///
/// `receive` pops queued frames and reports end of stream once the queue is
/// empty. Everything sent is recorded.
#[derive(Default)]
pub struct MemoryConnection {
    inbound: Mutex<VecDeque<Result<Message, BotError>>>,
    outbound: Mutex<Vec<Message>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an inbound message
    pub fn push(&self, message: Message) {
        if let Ok(mut inbound) = self.inbound.lock() {
            inbound.push_back(Ok(message));
        }
    }

    /// Queue an inbound frame that fails to decode
    pub fn push_malformed(&self, reason: impl Into<String>) {
        if let Ok(mut inbound) = self.inbound.lock() {
            inbound.push_back(Err(BotError::Parse(reason.into())));
        }
    }

    /// Messages sent so far, in send order
    pub fn sent(&self) -> Vec<Message> {
        self.outbound.lock()
            .map(|o| o.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn receive(&self) -> Option<Result<Message, BotError>> {
        self.inbound.lock().ok()?.pop_front()
    }

    async fn send(&self, message: &Message) -> Result<(), BotError> {
        let mut outbound = self.outbound.lock()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?;
        outbound.push(message.clone());
        Ok(())
    }
}
