//! Domain layer - Core business objects with no platform dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (User, Message, RollRequest, RollResult)
//! - Traits: Abstractions for infrastructure (Bot, RandomSource)

pub mod entities;
pub mod traits;
