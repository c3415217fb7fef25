//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use crate::domain::entities::{Message, User};
use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

pub const PLATFORM: &str = "console";
const CHAT_ID: &str = "console";

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    user: User,
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        let user = std::env::var("USER")
            .map(|name| User::new("console-user").with_username(name))
            .unwrap_or_else(|_| User::new("console-user"));

        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: name.into(),
                username: "console".to_string(),
            },
            user,
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Read the next line from stdin as an inbound message. `None` on EOF.
    ///
    /// Only the line ending is stripped; the rest reaches the parser verbatim.
    pub async fn next_message(&self) -> Result<Option<Message>, BotError> {
        let line = self.lines
            .lock()
            .await
            .next_line()
            .await
            .map_err(|e| BotError::Internal(format!("Failed to read stdin: {}", e)))?;

        Ok(line.map(|text| {
            Message::new(CHAT_ID, text)
                .with_sender(self.user.clone())
                .with_platform(PLATFORM)
        }))
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        println!("Type /roll XdY, Ctrl-D to quit");
        Ok(())
    }

    async fn stop(&self) -> Result<(), BotError> {
        tracing::info!("Console bot stopped");
        Ok(())
    }

    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<String, BotError> {
        println!("[BOT] {}", text);
        Ok("console_msg".to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
