//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod command;
pub mod profile;
pub mod reply;

pub use user::User;
pub use message::{Message, Content};
pub use command::{CommandKind, CommandRegistry};
pub use profile::{UserDirectory, UserProfile};
pub use reply::{KeyboardButton, OutgoingMessage, Reply};
