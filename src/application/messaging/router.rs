//! Command router - Turns inbound chat messages into dice replies

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use crate::domain::entities::{Message, RollRequest};
use crate::domain::traits::Bot;
use crate::application::errors::RollError;
use crate::application::services::DiceService;
use super::parser::RollParser;

/// Routes `/roll` commands to the dice service and replies in the same chat.
///
/// Holds no mutable state, so one router can serve concurrent messages.
pub struct CommandRouter {
    parser: RollParser,
    dice: DiceService,
}

impl CommandRouter {
    pub fn new(parser: RollParser, dice: DiceService) -> Self {
        Self { parser, dice }
    }

    /// Handle one inbound message. Never fails; send errors are logged.
    pub async fn on_message<B: Bot + ?Sized>(&self, bot: &B, message: &Message) {
        let bot_id = bot.bot_info().id;
        let Some(reply) = self.reply_for(&bot_id, message) else {
            return;
        };

        if let Err(e) = bot.send_message(&message.chat_id, &reply).await {
            tracing::error!("Failed to send message to chat_id {}: {}", message.chat_id, e);
        }
    }

    /// Handle a message on its own task, tracked in `tasks`
    pub fn spawn_on_message<B: Bot + 'static>(
        self: &Arc<Self>,
        tasks: &mut JoinSet<()>,
        bot: Arc<B>,
        message: Message,
    ) {
        let router = Arc::clone(self);
        tasks.spawn(async move {
            router.on_message(bot.as_ref(), &message).await;
        });
    }

    /// Compute the reply for a message, or `None` when it must be ignored.
    pub fn reply_for(&self, bot_id: &str, message: &Message) -> Option<String> {
        if message.sender_id() == Some(bot_id) {
            return None;
        }

        let request = match self.parser.parse(&message.text)? {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("[{}:{}] Rejected {:?}: {}", message.platform, message.chat_id, message.text, e);
                return Some(e.reply());
            }
        };

        let requester = message
            .sender
            .as_ref()
            .map(|u| u.mention())
            .unwrap_or_default();

        match self.dice.roll(request) {
            Ok(result) => {
                tracing::info!(
                    "[{}:{}] Drop with {}, {} dice for {} and the result is {:?}, sum {}",
                    message.platform, message.chat_id,
                    request.count, request.sides, requester, result.outcomes, result.sum
                );
                Some(format!(
                    "{}: {} drop(s) with a {} sided dice are [{}] and sum is {}",
                    requester, request.count, request.sides, result.joined(), result.sum
                ))
            }
            Err(e) => {
                log_generation_failure(request, &requester, &e);
                Some(e.reply())
            }
        }
    }
}

/// Wait up to `grace` for in-flight message tasks, aborting the rest.
///
/// Returns `true` when every task finished on its own.
pub async fn drain_tasks(tasks: &mut JoinSet<()>, grace: Duration) -> bool {
    let finished = tokio::time::timeout(grace, async {
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!("Message task failed: {}", e);
            }
        }
    })
    .await;

    if finished.is_err() {
        tracing::warn!("Abandoning {} unfinished message tasks", tasks.len());
        tasks.abort_all();
        return false;
    }
    true
}

fn log_generation_failure(request: RollRequest, requester: &str, error: &RollError) {
    tracing::error!(
        count = request.count,
        sides = request.sides,
        requester = %requester,
        "random generator failure: {}",
        error
    );
}
