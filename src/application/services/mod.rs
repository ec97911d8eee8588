//! Application services - Business logic orchestration

pub mod registration_service;

pub use registration_service::{Registration, RegistrationService};
