use std::time::Duration;

use log::*;

pub const DEFAULT_API_URL: &str = "https://api.earthmc.net/v3/aurora";
pub const DEFAULT_MAP_URL: &str = "https://map.earthmc.net/tiles/players.json";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct EarthMcConfig {
    /// Base url of the REST api, without a trailing slash. e.g. "https://api.earthmc.net/v3/aurora"
    pub api_url: String,
    /// Url of the live map's player list.
    pub map_url: String,
    /// Applied to every request. A slow endpoint delays a poll cycle by at most this much.
    pub timeout: Duration,
}

impl Default for EarthMcConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_string(), map_url: DEFAULT_MAP_URL.to_string(), timeout: DEFAULT_TIMEOUT }
    }
}

impl EarthMcConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("DEPOT_EARTHMC_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| {
                info!("🪛️ DEPOT_EARTHMC_API_URL not set, using {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            });
        let map_url = std::env::var("DEPOT_EARTHMC_MAP_URL").unwrap_or_else(|_| {
            info!("🪛️ DEPOT_EARTHMC_MAP_URL not set, using {DEFAULT_MAP_URL}");
            DEFAULT_MAP_URL.to_string()
        });
        let timeout = std::env::var("DEPOT_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for DEPOT_HTTP_TIMEOUT. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { api_url, map_url, timeout }
    }
}
