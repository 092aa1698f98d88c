//! Message handling - Event-driven message dispatch

pub mod classifier;
pub mod conversation;
pub mod dispatcher;
pub mod help;
pub mod pattern;

pub use conversation::{Conversation, ListenerConversation};
pub use dispatcher::Bot;
pub use pattern::{MatchResult, Pattern};
