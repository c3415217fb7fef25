//! Telegram adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::entities;
use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

pub const PLATFORM: &str = "telegram";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, BotError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::Network(format!(
                "Telegram API error: {}",
                self.description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }
}

impl Message {
    /// Convert to a domain message. Updates without text are dropped.
    pub fn to_domain(&self) -> Option<entities::Message> {
        let text = self.text.clone()?;
        let sender = self.from.as_ref().map(User::to_domain);
        Some(
            entities::Message::new(self.chat.id.to_string(), text)
                .with_sender_opt(sender)
                .with_platform(PLATFORM),
        )
    }
}

impl User {
    pub fn to_domain(&self) -> entities::User {
        let mut user = entities::User::new(self.id.to_string());
        if let Some(ref username) = self.username {
            user = user.with_username(username.clone());
        }
        if let Some(ref first) = self.first_name {
            user = user.with_first_name(first.clone());
        }
        user
    }
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    info: BotInfo,
    closed: AtomicBool,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            info: BotInfo {
                id: "unknown".to_string(),
                name: name.into(),
                username: "unknown".to_string(),
            },
            closed: AtomicBool::new(false),
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// Fetch bot identity from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: String,
        }

        let url = self.api_url("getMe");
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: ApiResponse<BotInfoResponse> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;
        let me = data.into_result()?;

        self.info = BotInfo {
            id: me.id.to_string(),
            name: me.first_name,
            username: me.username,
        };

        Ok(())
    }

    /// Get updates from Telegram using getUpdates long polling
    pub async fn get_updates(&self, offset: i64, timeout: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: i64,
            allowed_updates: Vec<String>,
        }

        let url = self.api_url("getUpdates");
        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("Telegram API error: {}", response.status())));
        }

        let data: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        data.into_result()
    }

    /// Get the next update offset, keeping the current one when nothing arrived
    pub fn get_next_offset(updates: &[Update], current: i64) -> i64 {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(current)
    }

    async fn send_message_api(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: &'a str,
            text: &'a str,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        let url = self.api_url("sendMessage");
        let request = SendMessageRequest { chat_id, text };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("Telegram API error: {}", response.status())));
        }

        let data: ApiResponse<MessageResult> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.into_result()?.message_id.to_string())
    }
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<(), BotError> {
        let prefix: String = self.token.chars().take(8).collect();
        tracing::info!("Starting Telegram bot (token: {}...)", prefix);
        self.closed.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), BotError> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::info!("Telegram bot stopped");
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BotError::Internal("Telegram connection closed".to_string()));
        }
        tracing::debug!("Sending to {}: {}", chat_id, text);
        self.send_message_api(chat_id, text).await
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_to_domain_message() {
        let raw = serde_json::json!({
            "update_id": 10,
            "message": {
                "message_id": 3,
                "from": { "id": 77, "is_bot": false, "username": "alice", "first_name": "Alice" },
                "chat": { "id": -100, "type": "group" },
                "date": 1700000000,
                "text": "/roll 3d6"
            }
        });
        let update: Update = serde_json::from_value(raw).unwrap();
        let message = update.message.unwrap().to_domain().unwrap();

        assert_eq!(message.chat_id, "-100");
        assert_eq!(message.text, "/roll 3d6");
        assert_eq!(message.platform, PLATFORM);
        assert_eq!(message.sender_id(), Some("77"));
        assert_eq!(message.sender.unwrap().mention(), "@alice");
    }

    #[test]
    fn test_message_without_text_is_dropped() {
        let raw = serde_json::json!({
            "message_id": 3,
            "chat": { "id": 5 },
            "photo": []
        });
        let message: Message = serde_json::from_value(raw).unwrap();
        assert!(message.to_domain().is_none());
    }

    #[test]
    fn test_next_offset() {
        let updates: Vec<Update> = serde_json::from_value(serde_json::json!([
            { "update_id": 4 },
            { "update_id": 9 }
        ])).unwrap();
        assert_eq!(TelegramAdapter::get_next_offset(&updates, 0), 10);
        assert_eq!(TelegramAdapter::get_next_offset(&[], 10), 10);
    }

    #[test]
    fn test_api_error_envelope() {
        let data: ApiResponse<Vec<Update>> = serde_json::from_value(serde_json::json!({
            "ok": false,
            "description": "Unauthorized"
        })).unwrap();
        let err = data.into_result().unwrap_err();
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn test_send_after_stop_fails() {
        let bot = TelegramAdapter::new("123456789:token", "roll-bot");
        bot.stop().await.unwrap();
        assert!(bot.send_message("1", "hi").await.is_err());
    }
}
