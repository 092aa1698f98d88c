//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use crate::domain::entities::{ChannelKind, Message};
use crate::domain::traits::Connection;
use crate::application::errors::BotError;

pub const CONSOLE_CHANNEL: &str = "console";
pub const CONSOLE_USER: &str = "console-user";

/// Console connection: each stdin line arrives as a direct message, replies are printed
pub struct ConsoleConnection {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleConnection {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for ConsoleConnection {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a console line into a direct message
pub fn console_message(line: &str) -> Message {
    Message::new(CONSOLE_CHANNEL, CONSOLE_USER, line.trim())
        .with_channel_kind(ChannelKind::Direct)
}

#[async_trait]
impl Connection for ConsoleConnection {
    async fn receive(&self) -> Option<Result<Message, BotError>> {
        let mut lines = self.lines.lock().await;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => return Some(Ok(console_message(&line))),
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!("Failed to read from stdin: {}", e);
                    return None;
                }
            }
        }
    }

    async fn send(&self, message: &Message) -> Result<(), BotError> {
        println!("[BOT] {}", message.text());
        Ok(())
    }
}
