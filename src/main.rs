use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;

mod domain;
mod application;
mod infrastructure;

use infrastructure::config::Config;
use infrastructure::storage::JsonUserStore;
use infrastructure::adapters::telegram::TelegramAdapter;
use infrastructure::adapters::console::{ConsoleAdapter, CONSOLE_CHAT};
use application::messaging::{MessageDispatcher, Replies};
use application::services::RegistrationService;
use domain::entities::{Message, Reply};
use domain::traits::{Bot, UserStore};

/// Long-poll timeout for getUpdates
const POLL_TIMEOUT_SECS: i64 = 30;

#[derive(Parser)]
#[command(name = "hotwheels-bot")]
#[command(about = "Registration bot for the Hot Wheels Elite web app", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// List registered users
    Users,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Run => run_bot(&cli.config, cli.token),
        Commands::Version => {
            println!("hotwheels-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
        Commands::Users => list_users(&cli.config, cli.token),
    };

    if let Err(e) = code {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

/// Config file if present, otherwise defaults; environment always overlays
/// and `--token` wins over both
fn load_config(config_path: &str, token_override: Option<String>) -> Result<Config, String> {
    let mut config = if Path::new(config_path).exists() {
        let mut config = Config::load(config_path).map_err(|e| e.to_string())?;
        config.apply_env(|key| std::env::var(key).ok());
        config
    } else {
        tracing::info!("No config at {}, using defaults", config_path);
        Config::load_env()
    };
    if let Some(token) = token_override {
        config.set_token(token);
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("Failed to start runtime: {}", e))
}

fn run_bot(config_path: &str, token_override: Option<String>) -> Result<(), String> {
    let config = load_config(config_path, token_override)?;
    tracing::info!("Starting hotwheels-bot: {}", config.bot.name);

    let store = Arc::new(JsonUserStore::new(&config.storage.users_file));
    tracing::info!("User store: {:?}", store.path());

    let registration = Arc::new(RegistrationService::new(store));
    let replies = Replies::new(&config.bot.name, &config.web_app.url, &config.bot.support);
    let dispatcher = MessageDispatcher::new(&config.bot.prefix, registration, replies);

    let rt = runtime()?;

    if let Some(token) = config.telegram_token().map(str::to_string) {
        rt.block_on(async {
            let mut bot = TelegramAdapter::new(token);

            // Register bot commands with Telegram
            if let Err(e) = bot.register_commands(dispatcher.commands()).await {
                tracing::warn!("Failed to register commands: {}", e);
            }

            run_telegram_bot(&mut bot, &dispatcher).await
        })
    } else {
        // Run console bot (dev mode)
        rt.block_on(async {
            let bot = ConsoleAdapter::new();
            run_console_bot(&bot, &dispatcher).await
        })
    }
}

/// Dispatch one message and send every part of its reply
async fn handle_message<B: Bot, S: UserStore>(bot: &B, dispatcher: &MessageDispatcher<S>, message: &Message) {
    let reply: Reply = match dispatcher.process(message).await {
        Ok(Some(reply)) => reply,
        Ok(None) => return,
        Err(e) => {
            tracing::error!("[{}] Failed to handle message: {}", message.chat_id, e);
            return;
        }
    };

    let preview = reply.preview();
    tracing::info!("Sending response to {} chat_id {}: {}", message.platform, message.chat_id, preview.chars().take(100).collect::<String>());

    for outgoing in &reply.messages {
        if let Err(e) = bot.send(&message.chat_id, outgoing).await {
            tracing::error!("Failed to send message: {}", e);
            return;
        }
    }
}

async fn run_telegram_bot<S: UserStore>(bot: &mut TelegramAdapter, dispatcher: &MessageDispatcher<S>) -> Result<(), String> {
    // Fetch bot info
    bot.fetch_bot_info().await.map_err(|e| format!("Failed to fetch bot info: {}", e))?;
    bot.start().await.map_err(|e| format!("Failed to start bot: {}", e))?;

    let info = bot.bot_info();
    tracing::info!("Bot started: {} @{} (id {})", info.name, info.username, info.id);

    let mut offset: i64 = 0;

    tracing::info!("Starting message loop...");

    loop {
        match bot.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::info!("Received {} updates", updates.len());
                }
                for update in &updates {
                    if let Some(message) = TelegramAdapter::to_domain(update, dispatcher.parser()) {
                        handle_message(&*bot, dispatcher, &message).await;
                    }
                }

                // Update offset
                offset = TelegramAdapter::get_next_offset(&updates, offset);
            }
            Err(e) => {
                tracing::error!("Failed to get updates: {}", e);
                tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            }
        }
    }
}

async fn run_console_bot<S: UserStore>(bot: &ConsoleAdapter, dispatcher: &MessageDispatcher<S>) -> Result<(), String> {
    bot.start().await.map_err(|e| format!("Failed to start bot: {}", e))?;

    let info = bot.bot_info();
    tracing::info!("Bot started: {} @{} (id {})", info.name, info.username, info.id);

    // Main loop (for console mode)
    while let Some(input) = bot.read_line("> ").await {
        if input.is_empty() {
            continue;
        }

        let message = dispatcher
            .parser()
            .parse(CONSOLE_CHAT, input, Some(bot.sender().clone()))
            .with_platform("console");
        handle_message(bot, dispatcher, &message).await;
    }

    tracing::info!("End of input, stopping console bot");
    Ok(())
}

fn list_users(config_path: &str, token_override: Option<String>) -> Result<(), String> {
    let config = load_config(config_path, token_override)?;
    let store = Arc::new(JsonUserStore::new(&config.storage.users_file));
    let registration = RegistrationService::new(store);

    let users = runtime()?
        .block_on(registration.users())
        .map_err(|e| e.to_string())?;

    println!("{} registered users", users.len());
    for user in users {
        println!(
            "{}\t@{}\t{}\t{}",
            user.id,
            user.username.as_deref().unwrap_or("-"),
            user.full_name(),
            user.registration_date.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

fn init_config() -> Result<(), String> {
    let yaml = serde_yaml::to_string(&Config::default()).map_err(|e| e.to_string())?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
