//! # Depot bot
//! The long-running process that watches the shop's drop-off chest and credits deposits. It is responsible for:
//! * Loading its configuration from the environment.
//! * Building the geofence from the shop owner's town.
//! * Running the deposit watcher against the live EarthMC api.
//! * Delivering deposit notices over Discord.
//!
//! ## Configuration
//! The bot is configured via environment variables. See [config](config/index.html) for more information, or run the
//! binary with any argument to print the help text.

pub mod bot;
pub mod cli;
pub mod config;
pub mod deposit_worker;
pub mod discord;
pub mod errors;
pub mod integrations;
