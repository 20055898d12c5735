//! Adapts the EarthMC api client to the world and identity traits that the deposit watcher polls.
use depot_engine::{
    reconciler::{ChunkCell, Geofence},
    traits::{BalanceReading, IdentityDirectory, LinkedIdentity, PlayerPosition, StableId, WorldFeed},
    WorldFeedError,
};
use earthmc_tools::{EarthMcApi, EarthMcApiError, TownBlock};
use log::*;

#[derive(Clone)]
pub struct EarthMcWorld {
    api: EarthMcApi,
}

impl EarthMcWorld {
    pub fn new(api: EarthMcApi) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &EarthMcApi {
        &self.api
    }

    /// Fetches the chunks of `town`. The town must exist and own at least one chunk.
    pub async fn geofence_for_town(&self, town: &str) -> Result<Geofence, EarthMcApiError> {
        let blocks = self.api.town_blocks(town).await?;
        if blocks.is_empty() {
            return Err(EarthMcApiError::EmptyResponse);
        }
        info!("🗺️ The drop-off area covers {} chunks of {town}", blocks.len());
        Ok(geofence_from_blocks(&blocks))
    }
}

pub fn geofence_from_blocks(blocks: &[TownBlock]) -> Geofence {
    Geofence::new(blocks.iter().map(|b| ChunkCell::new(b.x, b.z)))
}

fn to_feed_error(e: EarthMcApiError) -> WorldFeedError {
    if e.is_transport_failure() {
        WorldFeedError::Transport(e.to_string())
    } else {
        WorldFeedError::Parse(e.to_string())
    }
}

impl WorldFeed for EarthMcWorld {
    async fn player_positions(&self) -> Result<Vec<PlayerPosition>, WorldFeedError> {
        let players = self.api.player_positions().await.map_err(to_feed_error)?;
        Ok(players.into_iter().map(|p| PlayerPosition::new(p.name, p.x, p.z)).collect())
    }

    async fn player_balances(&self, names: &[String]) -> Result<Vec<BalanceReading>, WorldFeedError> {
        let balances = self.api.player_balances(names).await.map_err(to_feed_error)?;
        Ok(balances.into_iter().map(|b| BalanceReading::new(b.name, b.balance)).collect())
    }
}

impl IdentityDirectory for EarthMcWorld {
    async fn stable_ids(&self, names: &[String]) -> Result<Vec<StableId>, WorldFeedError> {
        let uuids = self.api.player_uuids(names).await.map_err(to_feed_error)?;
        Ok(uuids.into_iter().map(|p| StableId { name: p.name, id: p.uuid }).collect())
    }

    async fn linked_identities(&self, stable_ids: &[String]) -> Result<Vec<LinkedIdentity>, WorldFeedError> {
        let links = self.api.discord_links(stable_ids).await.map_err(to_feed_error)?;
        let linked = links
            .into_iter()
            .filter_map(|l| l.discord_id.map(|platform_id| LinkedIdentity { stable_id: l.uuid, platform_id }))
            .collect();
        Ok(linked)
    }
}
