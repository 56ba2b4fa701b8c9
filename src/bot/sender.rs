use std::time::Duration;

use teloxide::{
    requests::{Request, Requester},
    types::{ChatId, Recipient},
    Bot, RequestError,
};
use thiserror::Error;
use tokio::time::timeout;
use tracing::trace;

use crate::bot::message_builder::NotificationMessage;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] RequestError),
    #[error("telegram didn't answer within {0:?}")]
    Timeout(Duration),
}

/// Something able to post a message to one fixed chat.
#[rocket::async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends `message` exactly once. Failures are reported, never retried.
    async fn send(&self, message: &NotificationMessage) -> Result<(), DeliveryError>;
}

pub struct TelegramSender {
    bot: Bot,
    chat: Recipient,
    timeout: Duration,
}

impl TelegramSender {
    pub fn new(bot: Bot, chat: &str, timeout: Duration) -> Self {
        Self {
            bot,
            chat: recipient(chat),
            timeout,
        }
    }
}

#[rocket::async_trait]
impl NotificationSender for TelegramSender {
    async fn send(&self, message: &NotificationMessage) -> Result<(), DeliveryError> {
        trace!("sending message `{}` to chat {:?}", message, self.chat);

        let request = self
            .bot
            .send_message(self.chat.clone(), message.as_str())
            .send();
        match timeout(self.timeout, request).await {
            Ok(sent) => {
                sent?;
                Ok(())
            }
            Err(_) => Err(DeliveryError::Timeout(self.timeout)),
        }
    }
}

/// Numeric ids address a chat directly, anything else is a public `@channel` username.
pub fn recipient(chat: &str) -> Recipient {
    match chat.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(chat.to_owned()),
    }
}
