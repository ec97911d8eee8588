//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub web_app: WebAppConfig,
    pub storage: StorageConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    /// Contact shown in the help text
    pub support: String,
}

/// External web application opened by the bot's buttons
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WebAppConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub users_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub telegram: Option<TelegramConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "Hot Wheels Elite".to_string(),
                prefix: "/".to_string(),
                support: "@hotwheels_support".to_string(),
            },
            web_app: WebAppConfig {
                url: "https://hotwheels-elite.example".to_string(),
            },
            storage: StorageConfig {
                users_file: PathBuf::from("users.json"),
            },
            adapters: AdaptersConfig {
                telegram: Some(TelegramConfig {
                    enabled: false,
                    token: None,
                }),
                console: Some(ConsoleConfig {
                    enabled: true,
                }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Overlay `BOT_TOKEN`, `BOT_PREFIX`, `WEB_APP_URL` and `USERS_FILE`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var("BOT_TOKEN") {
            self.set_token(token);
        }

        if let Some(prefix) = var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Some(url) = var("WEB_APP_URL") {
            self.web_app.url = url;
        }

        if let Some(path) = var("USERS_FILE") {
            self.storage.users_file = PathBuf::from(path);
        }
    }

    /// Enable the Telegram adapter with `token`
    pub fn set_token(&mut self, token: impl Into<String>) {
        let tg = self.adapters.telegram.get_or_insert(TelegramConfig {
            enabled: true,
            token: None,
        });
        tg.token = Some(token.into());
        tg.enabled = true;
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.web_app.url.starts_with("https://") {
            // Telegram only opens web apps served over HTTPS
            return Err(ConfigError::InvalidValue(format!(
                "web-app.url must be an https:// URL, got '{}'",
                self.web_app.url
            )));
        }

        if let Some(tg) = &self.adapters.telegram {
            if tg.enabled && tg.token.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::MissingField("adapters.telegram.token".to_string()));
            }
        }

        Ok(())
    }

    /// Token of an enabled Telegram adapter
    pub fn telegram_token(&self) -> Option<&str> {
        self.adapters.telegram
            .as_ref()
            .filter(|t| t.enabled)
            .and_then(|t| t.token.as_deref())
    }
}
