//! Outbound reply payloads

/// Inline markup dialect of a text message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// Keyboard button for inline keyboards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardButton {
    pub text: String,
    /// URL opened inside the client as an embedded web app
    pub web_app: Option<String>,
}

impl KeyboardButton {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            web_app: None,
        }
    }

    pub fn with_web_app(mut self, url: impl Into<String>) -> Self {
        self.web_app = Some(url.into());
        self
    }
}

/// A single message sent back to the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    /// One row of inline buttons; empty means no keyboard
    pub buttons: Vec<KeyboardButton>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            buttons: Vec::new(),
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            parse_mode: Some(ParseMode::Markdown),
            ..Self::text(text)
        }
    }

    pub fn with_button(mut self, button: KeyboardButton) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn has_keyboard(&self) -> bool {
        !self.buttons.is_empty()
    }
}

/// Ordered messages produced for one inbound event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub messages: Vec<OutgoingMessage>,
}

impl Reply {
    pub fn single(message: OutgoingMessage) -> Self {
        Self { messages: vec![message] }
    }

    pub fn then(mut self, message: OutgoingMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn buttons(&self) -> impl Iterator<Item = &KeyboardButton> {
        self.messages.iter().flat_map(|m| m.buttons.iter())
    }

    /// All message texts joined, handy for logging
    pub fn preview(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
