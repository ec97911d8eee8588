//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: User registration and profile lookup
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing, keyword routing, replies, dispatching

pub mod errors;
pub mod services;
pub mod messaging;
