use std::{io, net::IpAddr, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use teloxide::Bot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod bot;
use bot::{Sentbot, TelegramSender};

mod config;
use config::SentbotConfig;

mod invoke;
use invoke::invoke;

mod server;
use server::{build_rocket, ServerAdapter};

mod webhooks;
use webhooks::WebhookHandler;

#[cfg(test)]
mod testing;

#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// YAML configuration file. Without it, configuration is read from the environment
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server and the Telegram bot
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1")]
        address: IpAddr,
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Handle a single request read from stdin and print the response on stdout
    Invoke,
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine, a broken one isn't
    let dotenv = match dotenvy::dotenv() {
        Err(err) if !err.not_found() => Err(err),
        _ => Ok(()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sentbot=info,warn")),
        )
        .with_writer(io::stderr)
        .init();

    dotenv.context("couldn't load .env file")?;
    let opts = Opts::parse();

    let config = match &opts.config {
        Some(path) => SentbotConfig::from_file(path)?,
        None => SentbotConfig::from_env().context("couldn't read configuration from environment")?,
    };
    if config.github_webhook_secret.is_none() {
        warn!("no webhook secret configured, signatures won't be verified!");
    }

    let bot = Bot::new(&config.telegram_bot_token);
    let sender = TelegramSender::new(
        bot.clone(),
        &config.telegram_channel_id,
        config.send_timeout(),
    );
    let handler = WebhookHandler::new(config.github_webhook_secret.clone(), Arc::new(sender));
    let adapter = ServerAdapter::new(handler);

    match opts.command {
        Command::Serve { address, port } => {
            let sentbot = Sentbot::new(bot, &config);

            let figment = rocket::Config::figment()
                .merge(("address", address))
                .merge(("port", port));
            let rocket = build_rocket(figment, adapter);

            info!("starting webhook server on http://{}:{}/webhook", address, port);
            tokio::select! {
                launched = rocket.launch() => launched.map(|_| ()).map_err(|err| anyhow!(err)),
                _ = sentbot.run() => Err(anyhow!("telegram dispatcher stopped")),
            }
        }
        Command::Invoke => invoke(&adapter, io::stdin(), io::stdout()).await,
    }
}
