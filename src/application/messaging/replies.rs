//! Canned reply texts and web-app buttons

use crate::domain::entities::{KeyboardButton, OutgoingMessage, Reply, User, UserProfile};

/// Builds every reply the bot sends
#[derive(Debug, Clone)]
pub struct Replies {
    app_name: String,
    web_app_url: String,
    support: String,
}

impl Replies {
    pub fn new(app_name: impl Into<String>, web_app_url: impl Into<String>, support: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            web_app_url: web_app_url.into(),
            support: support.into(),
        }
    }

    fn site(&self) -> &str {
        self.web_app_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
    }

    fn open_app_button(&self) -> KeyboardButton {
        KeyboardButton::new(format!("🚀 Открыть {}", self.app_name)).with_web_app(&self.web_app_url)
    }

    pub fn welcome(&self, user: &User) -> Reply {
        let text = format!(
            "🎉 Добро пожаловать, {name}!\n\n\
             Вы успешно зарегистрировались в {app}!\n\n\
             📱 *Что дальше?*\n\
             1. Нажмите кнопку \"Меню\" ниже\n\
             2. Выберите \"Открыть веб-приложение\"\n\
             3. Начните пользоваться всеми функциями!\n\n\
             ✨ *Доступные функции:*\n\
             • Просмотр коллекционных моделей\n\
             • Продажа своих моделей\n\
             • Общение с коллекционерами\n\
             • Уведомления о новых поступлениях\n\n\
             Наш сайт: {site}",
            name = user.greeting_name(),
            app = self.app_name,
            site = self.site(),
        );

        Reply::single(OutgoingMessage::markdown(text)).then(
            OutgoingMessage::text("Нажмите кнопку ниже, чтобы открыть приложение:")
                .with_button(self.open_app_button()),
        )
    }

    pub fn welcome_back(&self, user: &User) -> Reply {
        let text = format!(
            "С возвращением, {}! 🏎️\n\nИспользуйте кнопку ниже, чтобы открыть приложение:",
            user.greeting_name()
        );
        Reply::single(OutgoingMessage::text(text).with_button(self.open_app_button()))
    }

    pub fn profile(&self, profile: &UserProfile) -> Reply {
        let username = profile
            .username
            .as_deref()
            .map(|u| format!("@{}", u))
            .unwrap_or_else(|| "не указан".to_string());

        let text = format!(
            "📋 *Ваш профиль*\n\n\
             👤 *Имя:* {name}\n\
             🔗 *Username:* {username}\n\
             📅 *Дата регистрации:* {date}\n\
             🏎️ *Статус:* Активный коллекционер\n\n\
             *Статистика:*\n\
             • Просмотрено моделей: 0\n\
             • В избранном: 0\n\
             • Продано: 0\n\
             • Куплено: 0",
            name = profile.full_name(),
            username = username,
            date = profile.registration_date.format("%d.%m.%Y"),
        );
        Reply::single(OutgoingMessage::markdown(text))
    }

    pub fn not_registered(&self) -> Reply {
        Reply::single(OutgoingMessage::text(
            "Вы еще не зарегистрированы. Используйте /start для регистрации.",
        ))
    }

    pub fn help(&self) -> Reply {
        let text = format!(
            "🔧 *Помощь*\n\n\
             *Доступные команды:*\n\
             /start - Регистрация и начало работы\n\
             /profile - Просмотр вашего профиля\n\
             /catalog - Просмотр каталога моделей\n\
             /sell - Разместить модель на продажу\n\
             /help - Получить помощь\n\n\
             *Как пользоваться:*\n\
             1. Зарегистрируйтесь через /start\n\
             2. Откройте веб-приложение\n\
             3. Просматривайте и покупайте модели\n\
             4. Продавайте свои модели\n\n\
             *Поддержка:*\n\
             По вопросам пишите: {}",
            self.support
        );
        Reply::single(OutgoingMessage::markdown(text))
    }

    pub fn greeting(&self, user: Option<&User>) -> Reply {
        let text = match user {
            Some(user) => format!("Привет, {}! 🏎️", user.greeting_name()),
            None => "Привет! 🏎️".to_string(),
        };
        Reply::single(OutgoingMessage::text(text))
    }

    pub fn catalog(&self) -> Reply {
        Reply::single(
            OutgoingMessage::text("Просмотр каталога доступен в веб-приложении!\n\nНажмите кнопку ниже:")
                .with_button(KeyboardButton::new("📁 Открыть каталог").with_web_app(&self.web_app_url)),
        )
    }

    pub fn fallback(&self) -> Reply {
        Reply::single(
            OutgoingMessage::text(
                "Используйте команды:\n/start - начать работу\n/help - помощь\n\nИли откройте веб-приложение:",
            )
            .with_button(KeyboardButton::new("🚀 Открыть приложение").with_web_app(&self.web_app_url)),
        )
    }
}
