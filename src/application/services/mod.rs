//! Application services - Business logic orchestration

pub mod dice_service;

pub use dice_service::DiceService;
