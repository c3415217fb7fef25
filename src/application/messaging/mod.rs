//! Message handling - Event-driven message processing

pub mod parser;
pub mod router;

pub use parser::RollParser;
pub use router::CommandRouter;
