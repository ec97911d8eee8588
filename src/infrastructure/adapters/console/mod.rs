//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;
use crate::domain::entities::{OutgoingMessage, User};
use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

/// Chat id used for every console message
pub const CONSOLE_CHAT: &str = "console";

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    sender: User,
    stdin: Mutex<BufReader<Stdin>>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "hotwheels-bot".to_string(),
                username: "console".to_string(),
            },
            sender: User::new(CONSOLE_CHAT)
                .with_username("console")
                .with_name("Console", None::<String>),
            stdin: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }

    /// Identity attached to every console line
    pub fn sender(&self) -> &User {
        &self.sender
    }

    /// Read one trimmed line; `None` at end of input
    pub async fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        use std::io::Write;
        let _ = std::io::stdout().flush();

        let mut input = String::new();
        let read = self.stdin.lock().await.read_line(&mut input).await.ok()?;
        if read == 0 {
            return None;
        }
        Some(input.trim().to_string())
    }

    /// Text shown for a message, including its button row
    pub fn render(message: &OutgoingMessage) -> String {
        let mut out = format!("[BOT] {}", message.text);
        if message.has_keyboard() {
            let row: Vec<String> = message.buttons.iter()
                .map(|b| format!("{} <{}>", b.text, b.web_app.as_deref().unwrap_or_default()))
                .collect();
            out.push_str(&format!("\n  [Buttons] {}", row.join(" | ")));
        }
        out
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn send(&self, _chat_id: &str, message: &OutgoingMessage) -> Result<String, BotError> {
        println!("{}", Self::render(message));
        Ok("console_msg".to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
