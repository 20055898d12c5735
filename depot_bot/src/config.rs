use std::{env, time::Duration};

use depot_common::{helpers::parse_boolean_flag, Secret};
use depot_engine::{
    reconciler::{DEFAULT_PAUSED_POLL_INTERVAL, DEFAULT_POLL_INTERVAL},
    WatcherConfig,
    WorldPos,
};
use earthmc_tools::EarthMcConfig;
use log::*;

use crate::errors::BotError;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/depot_store.db";
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

#[derive(Clone, Debug)]
pub struct BotConfig {
    /// In-game name of the player who receives deposits.
    pub shop_owner: String,
    /// The town whose chunks make up the drop-off area.
    pub town: String,
    /// Where the drop-off chest stands. Ties between depositors go to whoever is closest to it.
    pub drop_off: WorldPos,
    pub database_url: String,
    /// Whether deposit matching is switched on at startup.
    pub auto_deposits: bool,
    pub poll_interval: Duration,
    pub paused_poll_interval: Duration,
    pub discord: DiscordConfig,
    pub earthmc: EarthMcConfig,
}

#[derive(Clone, Debug, Default)]
pub struct DiscordConfig {
    pub bot_token: Secret<String>,
    /// The channel that receives audit lines and failure notices.
    pub log_channel_id: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            shop_owner: String::default(),
            town: String::default(),
            drop_off: WorldPos::default(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auto_deposits: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            paused_poll_interval: DEFAULT_PAUSED_POLL_INTERVAL,
            discord: DiscordConfig::default(),
            earthmc: EarthMcConfig::default(),
        }
    }
}

impl BotConfig {
    pub fn from_env_or_default() -> Self {
        let shop_owner = env::var("DEPOT_SHOP_OWNER").ok().unwrap_or_else(|| {
            error!("🪛️ DEPOT_SHOP_OWNER is not set. Please set it to the in-game name of the shop owner.");
            String::default()
        });
        let town = env::var("DEPOT_TOWN").ok().unwrap_or_else(|| {
            error!("🪛️ DEPOT_TOWN is not set. Please set it to the town that holds the drop-off chest.");
            String::default()
        });
        let x = parse_coordinate("DEPOT_CHEST_X", env::var("DEPOT_CHEST_X").ok());
        let z = parse_coordinate("DEPOT_CHEST_Z", env::var("DEPOT_CHEST_Z").ok());
        let database_url = env::var("DEPOT_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ DEPOT_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auto_deposits = parse_boolean_flag(env::var("DEPOT_AUTO_DEPOSITS").ok(), true);
        if !auto_deposits {
            warn!("🪛️ Deposit matching is switched off. Deposits will not be credited until it is switched on.");
        }
        let poll_interval =
            parse_seconds("DEPOT_POLL_INTERVAL", env::var("DEPOT_POLL_INTERVAL").ok(), DEFAULT_POLL_INTERVAL);
        let paused_poll_interval = parse_seconds(
            "DEPOT_PAUSED_POLL_INTERVAL",
            env::var("DEPOT_PAUSED_POLL_INTERVAL").ok(),
            DEFAULT_PAUSED_POLL_INTERVAL,
        );
        let earthmc = EarthMcConfig::new_from_env_or_default();
        let discord = DiscordConfig::from_env_or_default(earthmc.timeout);
        Self {
            shop_owner,
            town,
            drop_off: WorldPos::new(x, z),
            database_url,
            auto_deposits,
            poll_interval,
            paused_poll_interval,
            discord,
            earthmc,
        }
    }

    /// Checks that every setting without a usable default has been provided, and that the log channel id is usable.
    pub fn validate(&self) -> Result<(), BotError> {
        let mut problems = [
            ("DEPOT_DISCORD_BOT_TOKEN", self.discord.bot_token.reveal().is_empty()),
            ("DEPOT_LOG_CHANNEL_ID", self.discord.log_channel_id.is_empty()),
            ("DEPOT_SHOP_OWNER", self.shop_owner.is_empty()),
            ("DEPOT_TOWN", self.town.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, is_missing)| is_missing.then(|| format!("{name} is not set")))
        .collect::<Vec<_>>();
        let channel = &self.discord.log_channel_id;
        if !channel.is_empty() && channel.parse::<u64>().is_err() {
            problems.push(format!("DEPOT_LOG_CHANNEL_ID must be a numeric channel id, not '{channel}'"));
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(BotError::ConfigurationError(problems.join(". ")))
        }
    }

    pub fn watcher_config(&self) -> WatcherConfig {
        let mut config = WatcherConfig::new(self.shop_owner.clone(), self.drop_off);
        config.poll_interval = self.poll_interval;
        config.paused_poll_interval = self.paused_poll_interval;
        config
    }
}

impl DiscordConfig {
    /// Each setting is read on its own, so one bad value never hides the others. Problems are reported by
    /// [`BotConfig::validate`].
    pub fn from_env_or_default(timeout: Duration) -> Self {
        Self::from_values(env::var("DEPOT_DISCORD_BOT_TOKEN").ok(), env::var("DEPOT_LOG_CHANNEL_ID").ok(), timeout)
    }

    pub fn from_values(bot_token: Option<String>, log_channel_id: Option<String>, timeout: Duration) -> Self {
        let bot_token = bot_token.unwrap_or_else(|| {
            error!("🪛️ DEPOT_DISCORD_BOT_TOKEN is not set. The bot cannot log in to Discord without it.");
            String::default()
        });
        let log_channel_id = log_channel_id.map(|s| s.trim().to_string()).unwrap_or_else(|| {
            error!("🪛️ DEPOT_LOG_CHANNEL_ID is not set. Please set it to the id of the audit log channel.");
            String::default()
        });
        if !log_channel_id.is_empty() && log_channel_id.parse::<u64>().is_err() {
            error!("🪛️ DEPOT_LOG_CHANNEL_ID must be a numeric channel id, not '{log_channel_id}'");
        }
        Self {
            bot_token: Secret::new(bot_token),
            log_channel_id,
            api_url: DEFAULT_DISCORD_API_URL.to_string(),
            timeout,
        }
    }
}

fn parse_coordinate(name: &str, value: Option<String>) -> f64 {
    match value {
        None => {
            info!("🪛️ {name} is not set. Using 0.");
            0.0
        },
        Some(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or_else(|| {
            warn!("🪛️ Invalid configuration value for {name}: '{s}'. Using 0.");
            0.0
        }),
    }
}

fn parse_seconds(name: &str, value: Option<String>, default: Duration) -> Duration {
    value
        .ok_or_else(|| info!("🪛️ {name} is not set. Using the default value of {}s.", default.as_secs()))
        .and_then(|s| {
            s.trim()
                .parse::<u64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for {name}. {e}"))
                .and_then(|secs| match secs {
                    0 => Err(warn!("🪛️ {name} must be at least one second.")),
                    secs => Ok(Duration::from_secs(secs)),
                })
        })
        .unwrap_or(default)
}
