use teloxide::utils::command::BotCommands;

pub mod commands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "check that the bot is alive.")]
    Start,
}
