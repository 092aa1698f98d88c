//! Message classifier - Decides whether a message is addressed to the bot
//! and normalizes its derived text for command matching

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use crate::domain::entities::Message;

/// Reserved keyword that triggers the auto-generated command list
pub const HELP_KEYWORD: &str = "help";

/// `<target>` or `<target|label>`
static LINK_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([^<>|]*)(?:\|([^<>]*))?>").expect("link markup regex"));

/// Mention token the backend uses to reference a user
pub fn mention_token(user_id: &str) -> String {
    format!("<@{}>", user_id)
}

impl Message {
    /// True if the message starts with the prefix, mentions the bot, or was
    /// posted in a direct channel. An empty prefix never matches.
    pub fn is_bot_message(&self, prefix: &str, bot_id: &str) -> bool {
        let prefixed = !prefix.is_empty() && self.text().starts_with(prefix);
        prefixed || self.mentions(bot_id) || self.is_direct()
    }

    pub fn mentions(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.text().contains(&mention_token(user_id))
    }

    /// True if the message was authored by the given user
    pub fn is_from(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.sender_id == user_id
    }

    /// Remove the first mention of `bot_id` from the derived text
    pub fn strip_mention(&mut self, bot_id: &str) {
        if !self.mentions(bot_id) {
            return;
        }
        let stripped = self.text().replacen(&mention_token(bot_id), "", 1);
        self.set_text(stripped.trim());
    }

    /// Replace `<url|label>` with `label` and `<url>` with `url`
    pub fn strip_link_markup(&mut self) {
        if !self.text().contains('<') {
            return;
        }

        let stripped = LINK_MARKUP.replace_all(self.text(), |caps: &Captures| {
            caps.get(2)
                .or_else(|| caps.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        });
        let stripped = stripped.into_owned();
        self.set_text(stripped);
    }

    /// Remove a single leading occurrence of `prefix` from the derived text
    pub fn strip_prefix(&mut self, prefix: &str) {
        if prefix.is_empty() {
            return;
        }
        if let Some(stripped) = self.text().strip_prefix(prefix) {
            let stripped = stripped.trim_start().to_string();
            self.set_text(stripped);
        }
    }

    /// Apply mention, link-markup and prefix stripping, in that order
    pub fn normalize(&mut self, prefix: &str, bot_id: &str) {
        self.strip_mention(bot_id);
        self.strip_link_markup();
        self.strip_prefix(prefix);
    }

    pub fn is_help_request(&self) -> bool {
        self.text() == HELP_KEYWORD
    }
}
