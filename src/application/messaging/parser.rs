//! Message parser - Parses raw guild messages into structured messages

use crate::domain::entities::{Content, Message, User};

/// Parses incoming guild text into Message objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Parse a line of text sent to a guild
    pub fn parse(&self, guild_id: impl Into<String>, text: impl AsRef<str>, sender: Option<User>) -> Message {
        let guild_id = guild_id.into();
        let text = text.as_ref().trim();

        if text.is_empty() {
            return Message::new(guild_id, Content::Empty).with_sender_opt(sender);
        }

        match self.strip_prefix(text) {
            Some(cmd_text) => self.parse_command(guild_id, cmd_text, sender),
            None => Message::from_text(guild_id, text).with_sender_opt(sender),
        }
    }

    fn strip_prefix<'a>(&self, text: &'a str) -> Option<&'a str> {
        if !self.command_prefix.is_empty() {
            if let Some(rest) = text.strip_prefix(self.command_prefix.as_str()) {
                return Some(rest);
            }
        }
        // Slash commands always work regardless of prefix
        text.strip_prefix('/')
    }

    fn parse_command(&self, guild_id: String, cmd_text: &str, sender: Option<User>) -> Message {
        let mut parts = cmd_text.split_whitespace();
        let name = parts.next().unwrap_or_default().to_string();
        if name.is_empty() {
            return Message::new(guild_id, Content::Empty).with_sender_opt(sender);
        }
        let args = parts.map(str::to_string).collect();

        Message::from_command(guild_id, name, args).with_sender_opt(sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_with_args() {
        let parser = MessageParser::new("!");
        let msg = parser.parse("g1", "!Balance bob", None);
        assert_eq!(
            msg.content,
            Content::Command {
                name: "Balance".to_string(),
                args: vec!["bob".to_string()]
            }
        );
        assert!(parser.parse("g1", "/daily", None).content.is_command());
    }

    #[test]
    fn test_plain_text_and_empty() {
        let parser = MessageParser::new("/");
        let msg = parser.parse("g1", "  hello there ", Some(User::new("1")));
        assert_eq!(msg.content.text(), Some("hello there"));
        assert_eq!(msg.sender.map(|u| u.id).as_deref(), Some("1"));
        assert_eq!(parser.parse("g1", "   ", None).content, Content::Empty);
        assert_eq!(parser.parse("g1", "/", None).content, Content::Empty);
    }
}
