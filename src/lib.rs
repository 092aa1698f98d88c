//! Chat-bot event dispatcher for the Slack real-time messaging API.
//!
//! A [`Bot`] owns one live [`Connection`], classifies every inbound message
//! and routes it to the registered commands and listeners.
//!
//! ```no_run
//! use rtm_bot::{Bot, Conversation};
//!
//! # async fn run() -> Result<(), rtm_bot::BotError> {
//! let bot = Bot::new("xoxb-token").await?;
//! bot.command("hello {name}", |conv: Conversation| async move {
//!     let name = conv.param("name").unwrap_or("there").to_string();
//!     let _ = conv.reply(format!("Hello, {}!", name)).await;
//! })?;
//! bot.listen().await;
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::errors::{BotError, ConfigError};
pub use application::messaging::{Bot, Conversation, ListenerConversation, MatchResult, Pattern};
pub use domain::entities::{ChannelKind, Command, CommandHandler, Listener, ListenerHandler, Message};
pub use domain::traits::{Connection, Spawner};
pub use infrastructure::config::Config;
