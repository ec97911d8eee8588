//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: JSON file user store
//! - Adapters: Platform integrations (Telegram, console)

pub mod config;
pub mod storage;
pub mod adapters;
