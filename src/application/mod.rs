//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Dice rolling
//! - Errors: Domain-specific errors
//! - Messaging: Command parsing and routing

pub mod errors;
pub mod services;
pub mod messaging;
