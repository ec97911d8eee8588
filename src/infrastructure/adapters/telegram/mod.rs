//! Telegram adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{self, CommandRegistry, KeyboardButton, OutgoingMessage};
use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

impl From<&User> for entities::User {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Serialize)]
struct InlineKeyboardButton {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_app: Option<WebAppInfo>,
}

#[derive(Serialize)]
struct WebAppInfo {
    url: String,
}

impl From<&KeyboardButton> for InlineKeyboardButton {
    fn from(btn: &KeyboardButton) -> Self {
        Self {
            text: btn.text.clone(),
            web_app: btn.web_app.clone().map(|url| WebAppInfo { url }),
        }
    }
}

#[derive(Serialize)]
struct ReplyMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Serialize)]
struct SendMessageRequest {
    chat_id: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup>,
}

impl SendMessageRequest {
    fn new(chat_id: &str, message: &OutgoingMessage) -> Self {
        let reply_markup = message.has_keyboard().then(|| ReplyMarkup {
            inline_keyboard: vec![message.buttons.iter().map(InlineKeyboardButton::from).collect()],
        });

        Self {
            chat_id: chat_id.to_string(),
            text: message.text.clone(),
            parse_mode: message.parse_mode.map(|m| m.as_str().to_string()),
            reply_markup,
        }
    }

    /// Same message without markup parsing; the keyboard is kept
    fn without_parse_mode(self) -> Self {
        Self { parse_mode: None, ..self }
    }
}

/// Telegram answers 400 when it cannot parse the message entities
fn should_retry_plain(err: &BotError) -> bool {
    matches!(err, BotError::Api { status: 400, .. })
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    info: BotInfo,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            info: BotInfo {
                id: "unknown".to_string(),
                name: "hotwheels-bot".to_string(),
                username: "hotwheels_bot".to_string(),
            },
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct Response {
            result: BotInfoResponse,
        }

        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: String,
        }

        let url = self.api_url("getMe");
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("Telegram API error: {}", response.status())));
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        self.info = BotInfo {
            id: data.result.id.to_string(),
            name: data.result.first_name,
            username: data.result.username,
        };

        Ok(())
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64, timeout: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: i64,
            allowed_updates: Vec<String>,
        }

        #[derive(Deserialize)]
        struct Response {
            result: Vec<Update>,
        }

        let url = self.api_url("getUpdates");
        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("Telegram API error: {}", response.status())));
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.result)
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update], current: i64) -> i64 {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(current)
    }

    /// Convert a text update into a domain message; other updates and
    /// messages sent by bots are skipped
    pub fn to_domain(update: &Update, parser: &MessageParser) -> Option<entities::Message> {
        let msg = update.message.as_ref()?;
        let text = msg.text.as_deref()?;
        if msg.from.as_ref().is_some_and(|u| u.is_bot) {
            return None;
        }
        let sender = msg.from.as_ref().map(entities::User::from);

        Some(parser
            .parse(msg.chat.id.to_string(), text, sender)
            .with_platform("telegram"))
    }

    /// POST a sendMessage request, returning the new message id
    async fn post_message(&self, request: &SendMessageRequest) -> Result<String, BotError> {
        #[derive(Deserialize)]
        struct Response {
            result: MessageResult,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        let url = self.api_url("sendMessage");
        let response = self.client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let description = response.text().await.unwrap_or_default();
            return Err(BotError::Api { status, description });
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.result.message_id.to_string())
    }

    /// Register bot commands with Telegram
    pub async fn register_commands(&self, registry: &CommandRegistry) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct Command {
            command: String,
            description: String,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest {
            commands: Vec<Command>,
        }

        let commands = registry.all()
            .into_iter()
            .map(|c| Command {
                command: c.name.clone(),
                description: c.description.clone().unwrap_or_else(|| c.name.clone()),
            })
            .collect();

        let url = self.api_url("setMyCommands");
        let request = SetMyCommandsRequest { commands };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(BotError::Network(format!("Failed to register commands: {}", error)));
        }

        tracing::info!("Registered bot commands with Telegram");
        Ok(())
    }
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<(), BotError> {
        let bot_id = self.token.split(':').next().unwrap_or_default();
        tracing::info!("Starting Telegram bot {} (@{})", bot_id, self.info.username);
        Ok(())
    }

    async fn send(&self, chat_id: &str, message: &OutgoingMessage) -> Result<String, BotError> {
        tracing::debug!("Sending to {}: {}", chat_id, message.text);

        let request = SendMessageRequest::new(chat_id, message);
        match self.post_message(&request).await {
            Ok(id) => Ok(id),
            Err(e) if request.parse_mode.is_some() && should_retry_plain(&e) => {
                // Unbalanced markup in user-supplied names is rejected by Telegram
                tracing::warn!("Markdown failed, using plain text: {}", e);
                self.post_message(&request.without_parse_mode()).await
            }
            Err(e) => Err(e),
        }
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
