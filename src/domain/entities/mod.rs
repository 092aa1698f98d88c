//! Domain entities - Messages, commands and listeners

pub mod message;
pub mod command;
pub mod listener;

pub use message::{Message, ChannelKind};
pub use command::{Command, CommandHandler, CommandRegistry};
pub use listener::{Listener, ListenerHandler, ListenerRegistry};
