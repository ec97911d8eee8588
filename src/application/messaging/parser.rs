//! Message parser - Parses raw messages into structured messages

use crate::domain::entities::{Message, Content, User};

/// Parses incoming messages into structured Message objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a text message
    pub fn parse(&self, chat_id: impl Into<String>, text: impl Into<String>, sender: Option<User>) -> Message {
        let text = text.into();
        let chat_id = chat_id.into();

        if text.trim().is_empty() {
            return Message::new(chat_id, Content::Empty).with_sender_opt(sender);
        }

        // Check if it's a command
        if text.starts_with('/') || (!self.command_prefix.is_empty() && text.starts_with(&self.command_prefix)) {
            return self.parse_command(chat_id, text, sender);
        }

        // Regular text message
        Message::new(chat_id, Content::Text(text)).with_sender_opt(sender)
    }

    /// Parse a command message
    fn parse_command(&self, chat_id: String, text: String, sender: Option<User>) -> Message {
        // Remove the command prefix (either / or custom prefix)
        let cmd_text = if text.starts_with('/') {
            text.trim_start_matches('/')
        } else {
            text.trim_start_matches(self.command_prefix.as_str())
        };

        // A bare prefix ("/", "/ hello") names no command
        if cmd_text.is_empty() || cmd_text.starts_with(char::is_whitespace) {
            return Message::new(chat_id, Content::Text(text)).with_sender_opt(sender);
        }

        // Split command and arguments
        let mut parts = cmd_text.split_whitespace();
        let head = parts.next().unwrap_or_default();
        // Group chats address commands as /start@botname
        let name = head.split('@').next().unwrap_or_default().to_string();
        if name.is_empty() {
            return Message::new(chat_id, Content::Text(text)).with_sender_opt(sender);
        }
        let args = parts.map(|s| s.to_string()).collect();

        Message::new(chat_id, Content::Command { name, args }).with_sender_opt(sender)
    }
}

impl Message {
    /// Helper to set sender as Option
    pub fn with_sender_opt(mut self, user: Option<User>) -> Self {
        if let Some(u) = user {
            self.sender = Some(u);
        }
        self
    }
}
