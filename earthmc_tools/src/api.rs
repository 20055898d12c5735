use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
    Method,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    config::EarthMcConfig,
    data_objects::{
        parse_discord_links,
        parse_map_players,
        parse_player_balances,
        parse_player_uuids,
        parse_town_blocks,
        DiscordLink,
        MapPlayer,
        PlayerBalance,
        PlayerUuid,
        TownBlock,
    },
    EarthMcApiError,
};

#[derive(Clone)]
pub struct EarthMcApi {
    config: EarthMcConfig,
    client: Arc<Client>,
}

impl EarthMcApi {
    pub fn new(config: EarthMcConfig) -> Result<Self, EarthMcApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| EarthMcApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &EarthMcConfig {
        &self.config
    }

    /// Sends a request and returns the JSON body. Non-2xx statuses and non-JSON bodies are errors.
    pub async fn rest_query<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<B>,
    ) -> Result<Value, EarthMcApiError> {
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| EarthMcApiError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| EarthMcApiError::Transport(e.to_string()))?;
            return Err(EarthMcApiError::QueryError { status, message });
        }
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);
        if !is_json {
            return Err(EarthMcApiError::JsonError(format!("{url} did not respond with JSON")));
        }
        trace!("REST query successful. {}", response.status());
        response.json::<Value>().await.map_err(|e| EarthMcApiError::JsonError(e.to_string()))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    pub async fn town_blocks(&self, town: &str) -> Result<Vec<TownBlock>, EarthMcApiError> {
        let body = json!({ "query": [town], "template": { "coordinates": true } });
        debug!("Fetching town blocks for {town}");
        let response = self.rest_query(Method::POST, &self.url("/towns"), Some(body)).await?;
        let blocks = parse_town_blocks(&response)?;
        info!("Fetched {} town blocks for {town}", blocks.len());
        Ok(blocks)
    }

    /// Everyone currently visible on the live map.
    pub async fn player_positions(&self) -> Result<Vec<MapPlayer>, EarthMcApiError> {
        let url = self.config.map_url.clone();
        let response = self.rest_query::<()>(Method::GET, &url, None).await?;
        let players = parse_map_players(&response)?;
        trace!("{} players on the map", players.len());
        Ok(players)
    }

    pub async fn player_balances(&self, names: &[String]) -> Result<Vec<PlayerBalance>, EarthMcApiError> {
        if names.is_empty() {
            return Ok(vec![]);
        }
        let body = json!({ "query": names, "template": { "name": true, "stats": true } });
        let response = self.rest_query(Method::POST, &self.url("/players"), Some(body)).await?;
        parse_player_balances(&response)
    }

    pub async fn player_uuids(&self, names: &[String]) -> Result<Vec<PlayerUuid>, EarthMcApiError> {
        if names.is_empty() {
            return Ok(vec![]);
        }
        let body = json!({ "query": names, "template": { "name": true, "uuid": true } });
        let response = self.rest_query(Method::POST, &self.url("/players"), Some(body)).await?;
        parse_player_uuids(&response)
    }

    pub async fn discord_links(&self, uuids: &[String]) -> Result<Vec<DiscordLink>, EarthMcApiError> {
        if uuids.is_empty() {
            return Ok(vec![]);
        }
        let query = uuids.iter().map(|u| json!({ "type": "minecraft", "target": u })).collect::<Vec<Value>>();
        let body = json!({ "query": query });
        let response = self.rest_query(Method::POST, &self.url("/discord"), Some(body)).await?;
        parse_discord_links(&response)
    }
}
