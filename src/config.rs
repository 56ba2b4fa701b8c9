use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;

const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
const TELEGRAM_CHANNEL_ID: &str = "TELEGRAM_CHANNEL_ID";
const GITHUB_WEBHOOK_SECRET: &str = "GITHUB_WEBHOOK_SECRET";
const ADMIN_CHAT_ID: &str = "ADMIN_CHAT_ID";
const SEND_TIMEOUT_SECS: &str = "SEND_TIMEOUT_SECS";

const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct SentbotConfig {
    /// Token of the Telegram bot, as given by @BotFather
    pub telegram_bot_token: String,
    /// Chat where push notifications are posted: a numeric chat id or a `@channel` username
    pub telegram_channel_id: String,
    /// Shared secret configured on the GitHub webhook. When absent, signatures are not checked.
    #[serde(default)]
    pub github_webhook_secret: Option<String>,
    /// Chat receiving error reports from the bot, if any
    #[serde(default)]
    pub admin_chat_id: Option<String>,
    /// Upper bound on a single outbound Telegram call
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

fn default_send_timeout_secs() -> u64 {
    DEFAULT_SEND_TIMEOUT_SECS
}

impl SentbotConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let config_file =
            File::open(path).with_context(|| format!("couldn't open {}:", path.display()))?;
        let config: Self = serde_yaml::from_reader(BufReader::new(config_file))
            .context("couldn't parse config file")?;

        config.validated()
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| anyhow!("{} is not set", key))
        };

        let send_timeout_secs = match lookup(SEND_TIMEOUT_SECS) {
            Some(value) => value
                .parse()
                .with_context(|| format!("{} must be a number of seconds", SEND_TIMEOUT_SECS))?,
            None => DEFAULT_SEND_TIMEOUT_SECS,
        };

        let config = Self {
            telegram_bot_token: required(TELEGRAM_BOT_TOKEN)?,
            telegram_channel_id: required(TELEGRAM_CHANNEL_ID)?,
            github_webhook_secret: lookup(GITHUB_WEBHOOK_SECRET),
            admin_chat_id: lookup(ADMIN_CHAT_ID),
            send_timeout_secs,
        };

        config.validated()
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    fn validated(mut self) -> anyhow::Result<Self> {
        if self.send_timeout_secs == 0 {
            bail!("{} must be at least 1 second", SEND_TIMEOUT_SECS);
        }

        // empty values are treated like unset ones
        self.github_webhook_secret = self.github_webhook_secret.filter(|s| !s.is_empty());
        self.admin_chat_id = self.admin_chat_id.filter(|s| !s.is_empty());
        Ok(self)
    }
}
