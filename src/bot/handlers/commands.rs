use teloxide::{requests::Requester, types::Message, Bot};
use tracing::debug;

use crate::bot::handlers::Command;

pub const START_REPLY: &str = "Bot is running!";

pub async fn answer_command(bot: Bot, msg: Message, command: Command) -> anyhow::Result<()> {
    debug!("received command {:?} in chat {}", command, msg.chat.id);

    match command {
        Command::Start => {
            bot.send_message(msg.chat.id, START_REPLY).await?;
        }
    }

    Ok(())
}
