use super::User;

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    Empty,
}

/// Represents an incoming message
#[derive(Debug, Clone)]
pub struct Message {
    pub chat_id: String,
    pub sender: Option<User>,
    pub content: Content,
    pub platform: String,
}

impl Message {
    pub fn new(chat_id: impl Into<String>, content: Content) -> Self {
        Self {
            chat_id: chat_id.into(),
            sender: None,
            content,
            platform: "unknown".to_string(),
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }
}
