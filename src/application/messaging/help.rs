//! Auto-generated help text listing the registered commands

use std::sync::Arc;
use crate::domain::entities::{Command, Message};
use super::classifier::mention_token;

const HELP_HEADER: &str = "I can help you with the following commands:\n\n";

/// Build the help reply for `message`: one line per command, in registration order
pub fn help_text(commands: &[Arc<Command>], message: &Message) -> String {
    let mut help = String::from(HELP_HEADER);

    for cmd in commands {
        help.push('`');
        help.push_str(cmd.pattern().as_str());
        help.push('`');
        if !cmd.description().is_empty() {
            help.push_str(" – ");
            help.push_str(cmd.description());
        }
        help.push('\n');
    }

    if message.is_direct() {
        help
    } else {
        format!("{}: {}", mention_token(&message.sender_id), help)
    }
}
