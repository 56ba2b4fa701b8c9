use std::sync::Arc;

use teloxide::{
    dispatching::{Dispatcher, HandlerExt, UpdateFilterExt},
    types::Update,
    Bot,
};
use tracing::{debug, info, trace};

use crate::config::SentbotConfig;

mod github;
pub use github::{format_push_event, MalformedPayload};

mod handlers;
use handlers::{commands::answer_command, Command};

mod message_builder;
pub use message_builder::NotificationMessage;

mod report;
use report::AdminReporter;

mod sender;
pub use sender::{DeliveryError, NotificationSender, TelegramSender};

/// The long-running Telegram side of the service: answers commands and reports its own errors
/// to the admin chat.
pub struct Sentbot {
    bot: Bot,
    reporter: Arc<AdminReporter>,
}

impl Sentbot {
    /// Creates a new [`Sentbot`] around an existing [`Bot`] handle.
    ///
    /// Error reports go to `admin_chat_id` when the [`SentbotConfig`] has one.
    pub fn new(bot: Bot, config: &SentbotConfig) -> Self {
        let admin = config.admin_chat_id.as_deref().map(|chat| {
            debug!("error reports will be sent to chat {}", chat);
            Arc::new(TelegramSender::new(bot.clone(), chat, config.send_timeout()))
                as Arc<dyn NotificationSender>
        });

        Self {
            bot,
            reporter: Arc::new(AdminReporter::new(admin)),
        }
    }

    /// Start polling Telegram for updates. Only returns once the dispatcher shuts down.
    pub async fn run(self) {
        info!("starting telegram dispatcher...");

        let handler = Update::filter_message()
            .filter_command::<Command>()
            .endpoint(answer_command);

        Dispatcher::builder(self.bot, handler)
            .error_handler(self.reporter)
            .default_handler(|update| async move {
                trace!("ignoring update {:?}", update.id);
            })
            .build()
            .dispatch()
            .await
    }
}
