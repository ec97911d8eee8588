use std::collections::HashMap;

/// Commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Start,
    Profile,
    Help,
}

/// Represents a bot command
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub kind: CommandKind,
    pub description: Option<String>,
}

impl Command {
    pub fn new(name: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn matches(&self, input: &str) -> bool {
        self.name.to_lowercase() == input.to_lowercase()
    }
}

/// Command registry for managing available commands
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with start, profile and help
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Command::new("start", CommandKind::Start)
            .with_description("Регистрация и начало работы"));
        registry.register(Command::new("profile", CommandKind::Profile)
            .with_description("Просмотр вашего профиля"));
        registry.register(Command::new("help", CommandKind::Help)
            .with_description("Получить помощь"));
        registry
    }

    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), command);
    }

    pub fn find(&self, input: &str) -> Option<&Command> {
        self.commands.values().find(|c| c.matches(input))
    }

    /// Commands sorted by name
    pub fn all(&self) -> Vec<&Command> {
        let mut commands: Vec<&Command> = self.commands.values().collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_case_insensitive() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(registry.all().len(), 3);
        assert_eq!(registry.find("START").map(|c| c.kind), Some(CommandKind::Start));
        assert_eq!(registry.find("Profile").map(|c| c.kind), Some(CommandKind::Profile));
        assert!(registry.find("catalog").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = CommandRegistry::with_defaults();
        registry.register(Command::new("help", CommandKind::Help).with_description("Справка"));

        let names: Vec<&str> = registry.all().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["help", "profile", "start"]);
        assert_eq!(registry.find("help").and_then(|c| c.description.as_deref()), Some("Справка"));
    }
}
