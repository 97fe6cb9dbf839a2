use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    // Token of the bot application in Discord
    pub discord_token: String,
    // Prefix used by the text (non-slash) commands
    pub prefix: String,
    // How long the sweeper waits between two passes over running giveaways
    pub sweep_interval: Duration,
}

impl Config {
    // Reads the configuration from the process environment. A `.env` file
    // in the working directory is loaded first, when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("Expected a DISCORD_TOKEN in the environment".to_string())
            })?;

        let prefix = lookup("BOT_PREFIX")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let sweep_interval_secs = match lookup("GIVEAWAY_SWEEP_INTERVAL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(value) if value > 0 => value,
                _ => {
                    let message = format!(
                        "GIVEAWAY_SWEEP_INTERVAL_SECS must be a positive number, got `{}`",
                        raw
                    );
                    return Err(Error::Config(message));
                }
            },
            None => DEFAULT_SWEEP_INTERVAL_SECS,
        };

        Ok(Config {
            discord_token,
            prefix,
            sweep_interval: Duration::from_secs(sweep_interval_secs),
        })
    }
}
