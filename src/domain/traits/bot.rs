use async_trait::async_trait;
use crate::domain::entities::OutgoingMessage;
use crate::application::errors::BotError;

/// Bot trait - abstraction for messaging platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Start the bot and begin listening for messages
    async fn start(&self) -> Result<(), BotError>;

    /// Send a message, with its optional markup and button row, to a chat
    async fn send(&self, chat_id: &str, message: &OutgoingMessage) -> Result<String, BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
