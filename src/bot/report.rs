use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Local, TimeZone};
use futures::future::BoxFuture;
use teloxide::error_handlers::ErrorHandler;
use tracing::{error, warn};

use crate::bot::{
    message_builder::{MessageBuilder, NotificationMessage},
    sender::NotificationSender,
};

const WARNING_EMOJI: &str = "⚠️";

/// Error handler of the bot dispatcher.
///
/// Every error is logged. When an admin chat is configured, a report is also posted there; if
/// that fails too, the failure is only logged.
pub struct AdminReporter {
    admin: Option<Arc<dyn NotificationSender>>,
}

impl AdminReporter {
    pub fn new(admin: Option<Arc<dyn NotificationSender>>) -> Self {
        Self { admin }
    }

    pub async fn report(&self, err: &anyhow::Error) {
        error!("unhandled error while handling an update: {:#}", err);

        let admin = match &self.admin {
            Some(admin) => admin,
            None => return,
        };

        let report = compose_report(Local::now(), err);
        if let Err(e) = admin.send(&report).await {
            warn!("couldn't send error report to the admin chat: {}", e);
        }
    }
}

impl ErrorHandler<anyhow::Error> for AdminReporter {
    fn handle_error(self: Arc<Self>, error: anyhow::Error) -> BoxFuture<'static, ()> {
        Box::pin(async move { self.report(&error).await })
    }
}

pub fn compose_report<Tz>(time: DateTime<Tz>, err: &anyhow::Error) -> NotificationMessage
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut message = MessageBuilder::new();

    message.tag(WARNING_EMOJI);
    message.line("Bot Error Report");
    message.line(&format!("Time: {}", time));
    message.line(&format!("Error: {:#}", err));
    message.line(&format!("Traceback: {}", err.backtrace()));

    message.build()
}
