use depot_common::Gold;
use thiserror::Error;

use crate::reconciler::WorldPos;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldFeedError {
    /// The request failed: unreachable host, timeout or a non-2xx status.
    #[error("Transport failure: {0}")]
    Transport(String),
    /// The request succeeded but the response could not be understood.
    #[error("Parse failure: {0}")]
    Parse(String),
}

/// A player visible in the game world.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPosition {
    pub name: String,
    pub position: WorldPos,
}

impl PlayerPosition {
    pub fn new<S: Into<String>>(name: S, x: f64, z: f64) -> Self {
        Self { name: name.into(), position: WorldPos::new(x, z) }
    }
}

/// An in-game balance as reported by the game's api.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReading {
    pub name: String,
    pub balance: Gold,
}

impl BalanceReading {
    pub fn new<S: Into<String>>(name: S, balance: Gold) -> Self {
        Self { name: name.into(), balance }
    }
}

/// A game-world name and its stable account id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableId {
    pub name: String,
    pub id: String,
}

/// A stable account id and the chat-platform identity linked to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedIdentity {
    pub stable_id: String,
    pub platform_id: String,
}

/// The read-only world feeds polled every cycle. All calls are best-effort.
#[allow(async_fn_in_trait)]
pub trait WorldFeed {
    /// Positions of every player currently online.
    async fn player_positions(&self) -> Result<Vec<PlayerPosition>, WorldFeedError>;

    /// Balances for the given names. Names that are unknown to the game are absent from the result.
    async fn player_balances(&self, names: &[String]) -> Result<Vec<BalanceReading>, WorldFeedError>;
}

/// Maps game-world names to chat-platform identities, via the game's stable account ids.
#[allow(async_fn_in_trait)]
pub trait IdentityDirectory {
    async fn stable_ids(&self, names: &[String]) -> Result<Vec<StableId>, WorldFeedError>;

    /// Only ids that have a linked platform identity are present in the result.
    async fn linked_identities(&self, stable_ids: &[String]) -> Result<Vec<LinkedIdentity>, WorldFeedError>;
}
