//! Platform adapters - Implementations of the `Bot` trait

pub mod console;
pub mod telegram;

pub use console::ConsoleAdapter;
pub use telegram::TelegramAdapter;
