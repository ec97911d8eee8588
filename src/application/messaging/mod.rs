//! Message handling - Event-driven message processing

pub mod classifier;
pub mod dispatcher;
pub mod parser;
pub mod replies;

pub use dispatcher::MessageDispatcher;
pub use parser::MessageParser;
pub use replies::Replies;
