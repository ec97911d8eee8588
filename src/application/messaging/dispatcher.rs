//! Message dispatcher - Routes messages to handlers

use std::sync::Arc;
use crate::domain::entities::{CommandKind, CommandRegistry, Content, Message, Reply, User};
use crate::domain::traits::UserStore;
use crate::application::errors::{BotError, CommandError};
use crate::application::services::{Registration, RegistrationService};
use super::classifier::{Intent, KeywordClassifier};
use super::parser::MessageParser;
use super::replies::Replies;

/// Handler result; `None` means the message gets no reply
pub type HandlerResult = Result<Option<Reply>, BotError>;

/// Message dispatcher - routes commands and free text to their handlers
pub struct MessageDispatcher<S: UserStore> {
    parser: MessageParser,
    commands: CommandRegistry,
    classifier: KeywordClassifier,
    registration: Arc<RegistrationService<S>>,
    replies: Replies,
}

impl<S: UserStore> MessageDispatcher<S> {
    pub fn new(prefix: impl Into<String>, registration: Arc<RegistrationService<S>>, replies: Replies) -> Self {
        Self {
            parser: MessageParser::new(prefix),
            commands: CommandRegistry::with_defaults(),
            classifier: KeywordClassifier::default(),
            registration,
            replies,
        }
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    /// Parse and process a raw text message
    #[cfg(test)]
    pub async fn process_text(&self, chat_id: impl Into<String>, text: impl Into<String>, sender: Option<User>) -> HandlerResult {
        let message = self.parser.parse(chat_id, text, sender);
        self.process(&message).await
    }

    /// Process a message through the dispatcher
    pub async fn process(&self, message: &Message) -> HandlerResult {
        match &message.content {
            Content::Command { name, args } => {
                tracing::debug!("[{}] Command: {} with args: {:?}", message.chat_id, name, args);
                let Some(command) = self.commands.find(name) else {
                    tracing::debug!("[{}] Ignoring unknown command /{}", message.chat_id, name);
                    return Ok(None);
                };
                let reply = match command.kind {
                    CommandKind::Start => self.handle_start(message).await?,
                    CommandKind::Profile => self.handle_profile(message).await?,
                    CommandKind::Help => self.replies.help(),
                };
                Ok(Some(reply))
            }
            Content::Text(text) => Ok(Some(self.handle_text(text, message.sender.as_ref()))),
            Content::Empty => Ok(None),
        }
    }

    async fn handle_start(&self, message: &Message) -> Result<Reply, BotError> {
        let user = require_sender(message)?;
        let reply = match self.registration.start(user).await? {
            Registration::New(_) => self.replies.welcome(user),
            Registration::Returning(_) => self.replies.welcome_back(user),
        };
        Ok(reply)
    }

    async fn handle_profile(&self, message: &Message) -> Result<Reply, BotError> {
        let user = require_sender(message)?;
        let reply = match self.registration.profile(&user.id).await? {
            Some(profile) => self.replies.profile(&profile),
            None => self.replies.not_registered(),
        };
        Ok(reply)
    }

    fn handle_text(&self, text: &str, sender: Option<&User>) -> Reply {
        let intent = self.classifier.classify(text);
        tracing::debug!("Routed text to {:?}", intent);
        match intent {
            Intent::Greeting => self.replies.greeting(sender),
            Intent::Catalog => self.replies.catalog(),
            Intent::Fallback => self.replies.fallback(),
        }
    }
}

fn require_sender(message: &Message) -> Result<&User, CommandError> {
    message
        .sender
        .as_ref()
        .ok_or_else(|| CommandError::InvalidArgs("message has no sender".to_string()))
}
