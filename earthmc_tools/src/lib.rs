//! A small typed client for the EarthMC REST api and the live map feed.
//!
//! Only the read-only queries needed to reconcile chest deposits are exposed: a town's chunk list, the positions of
//! everyone online, player balances, player UUIDs and the Discord accounts linked to those UUIDs.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::EarthMcApi;
pub use config::{EarthMcConfig, DEFAULT_API_URL, DEFAULT_MAP_URL, DEFAULT_TIMEOUT};
pub use data_objects::{DiscordLink, MapPlayer, PlayerBalance, PlayerUuid, TownBlock};
pub use error::EarthMcApiError;
