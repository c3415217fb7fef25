//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Random: Secure random source
//! - Adapters: Platform integrations (Telegram, console)

pub mod config;
pub mod random;
pub mod adapters;
