use depot_engine::LedgerError;
use earthmc_tools::EarthMcApiError;
use thiserror::Error;

use crate::discord::DiscordError;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Could not initialize the bot. {0}")]
    InitializeError(String),
    #[error("Invalid bot configuration. {0}")]
    ConfigurationError(String),
    #[error("Ledger error. {0}")]
    LedgerError(#[from] LedgerError),
    #[error("EarthMC api error. {0}")]
    EarthMcError(#[from] EarthMcApiError),
    #[error("Discord error. {0}")]
    DiscordError(#[from] DiscordError),
    #[error("An I/O error happened in the bot. {0}")]
    IOError(#[from] std::io::Error),
}
