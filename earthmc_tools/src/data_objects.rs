use depot_common::Gold;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::EarthMcApiError;

/// A town chunk, in chunk coordinates (world coordinates divided by 16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TownBlock {
    pub x: i64,
    pub z: i64,
}

/// A player on the live map. Only the horizontal coordinates are kept.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapPlayer {
    pub name: String,
    pub x: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerBalance {
    pub name: String,
    pub balance: Gold,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlayerUuid {
    pub name: String,
    pub uuid: String,
}

/// A Minecraft UUID and the Discord account linked to it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscordLink {
    pub uuid: String,
    pub discord_id: Option<String>,
}

/// Extracts the town block list from a `towns` query with the `coordinates` template.
pub(crate) fn parse_town_blocks(response: &Value) -> Result<Vec<TownBlock>, EarthMcApiError> {
    let town = response.as_array().and_then(|towns| towns.first()).ok_or(EarthMcApiError::EmptyResponse)?;
    let blocks = town["coordinates"]["townBlocks"]
        .as_array()
        .ok_or_else(|| EarthMcApiError::JsonError("'coordinates.townBlocks' does not exist in town".to_string()))?;
    blocks
        .iter()
        .map(|b| match (b[0].as_i64(), b[1].as_i64()) {
            (Some(x), Some(z)) => Ok(TownBlock { x, z }),
            _ => Err(EarthMcApiError::JsonError(format!("Invalid town block: {b}"))),
        })
        .collect()
}

/// The map feed is best-effort: entries that are not well-formed player objects are skipped.
pub(crate) fn parse_map_players(response: &Value) -> Result<Vec<MapPlayer>, EarthMcApiError> {
    let players = response["players"]
        .as_array()
        .ok_or_else(|| EarthMcApiError::JsonError("'players' does not exist in map feed".to_string()))?;
    let result = players
        .iter()
        .filter_map(|p| {
            serde_json::from_value::<MapPlayer>(p.clone())
                .map_err(|e| trace!("Skipping map entry {p}: {e}"))
                .ok()
        })
        .collect();
    Ok(result)
}

/// Extracts name and balance pairs from a `players` query with the `name` and `stats` templates. Players that are not
/// found are simply absent from the response.
pub(crate) fn parse_player_balances(response: &Value) -> Result<Vec<PlayerBalance>, EarthMcApiError> {
    let players = response.as_array().ok_or_else(|| EarthMcApiError::JsonError("Expected an array".to_string()))?;
    let mut result = Vec::with_capacity(players.len());
    for player in players.iter().filter(|p| p.is_object()) {
        let name = player["name"]
            .as_str()
            .ok_or_else(|| EarthMcApiError::JsonError(format!("'name' does not exist in player {player}")))?;
        let balance = player["stats"]["balance"]
            .as_f64()
            .ok_or_else(|| EarthMcApiError::JsonError(format!("'stats.balance' does not exist for {name}")))?;
        let balance = Gold::try_from_f64(balance).map_err(|e| EarthMcApiError::JsonError(e.to_string()))?;
        result.push(PlayerBalance { name: name.to_string(), balance });
    }
    Ok(result)
}

pub(crate) fn parse_player_uuids(response: &Value) -> Result<Vec<PlayerUuid>, EarthMcApiError> {
    let players = response.as_array().ok_or_else(|| EarthMcApiError::JsonError("Expected an array".to_string()))?;
    players
        .iter()
        .filter(|p| p.is_object())
        .map(|p| serde_json::from_value::<PlayerUuid>(p.clone()).map_err(|e| EarthMcApiError::JsonError(e.to_string())))
        .collect()
}

/// The `discord` endpoint answers with `{ "id": <discord id or null>, "uuid": <minecraft uuid> }` per query.
pub(crate) fn parse_discord_links(response: &Value) -> Result<Vec<DiscordLink>, EarthMcApiError> {
    let links = response.as_array().ok_or_else(|| EarthMcApiError::JsonError("Expected an array".to_string()))?;
    links
        .iter()
        .filter(|l| l.is_object())
        .map(|l| {
            let uuid = l["uuid"]
                .as_str()
                .ok_or_else(|| EarthMcApiError::JsonError(format!("'uuid' does not exist in {l}")))?
                .to_string();
            let discord_id = match &l["id"] {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            };
            Ok(DiscordLink { uuid, discord_id })
        })
        .collect()
}
