use async_trait::async_trait;
use crate::domain::entities::Message;
use crate::application::errors::BotError;

/// Connection trait - abstraction over the live link to the messaging backend
///
/// `receive` is driven by a single receive loop. `send` may be called
/// concurrently from many handler tasks and must serialize writes itself.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Block until the next inbound message is decoded.
    ///
    /// Returns `None` once the stream has ended. A frame that could not be
    /// decoded yields `Some(Err(BotError::Parse(..)))` and the stream stays usable.
    async fn receive(&self) -> Option<Result<Message, BotError>>;

    /// Write one message to the backend without waiting for acknowledgement
    async fn send(&self, message: &Message) -> Result<(), BotError>;
}
