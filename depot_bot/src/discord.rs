//! A minimal Discord REST client: just enough to DM a user and post to a channel as the bot.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use depot_engine::{DepositNotifier, NotifierError};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
    StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::DiscordConfig;

/// The default embed colour, Discord's "blue".
pub const EMBED_COLOUR: u32 = 0x3498db;

#[derive(Debug, Clone, Error)]
pub enum DiscordError {
    #[error("Could not initialize the Discord client: {0}")]
    Initialization(String),
    #[error("Request could not be completed: {0}")]
    Transport(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Discord rejected the request. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl DiscordError {
    /// Discord answers 403 when a user does not accept DMs from the bot and 404 when the user does not exist.
    pub fn is_unreachable_recipient(&self) -> bool {
        matches!(self, Self::QueryError { status, .. } if *status == 403 || *status == 404)
    }
}

/// The body of a `POST /channels/{id}/messages` request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
struct NewDmChannel<'a> {
    recipient_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct DmChannel {
    id: String,
}

#[derive(Clone)]
pub struct DiscordNotifier {
    api_url: String,
    log_channel_id: String,
    client: Arc<Client>,
}

impl DiscordNotifier {
    pub fn new(config: &DiscordConfig) -> Result<Self, DiscordError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bot {}", config.bot_token.reveal()))
            .map_err(|e| DiscordError::Initialization(format!("Invalid bot token. {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DiscordError::Initialization(e.to_string()))?;
        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            log_channel_id: config.log_channel_id.clone(),
            client: Arc::new(client),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    pub async fn rest_query<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<Value, DiscordError> {
        let url = self.url(path);
        trace!("🔔️ Sending Discord request: {url}");
        let response = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| DiscordError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.map_err(|e| DiscordError::Transport(e.to_string()))?;
            return Err(DiscordError::QueryError { status: status.as_u16(), message });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        response.json::<Value>().await.map_err(|e| DiscordError::JsonError(e.to_string()))
    }

    /// Opens (or reuses) the DM channel with `user_id` and returns its id.
    pub async fn open_dm_channel(&self, user_id: &str) -> Result<String, DiscordError> {
        let body = NewDmChannel { recipient_id: user_id };
        let channel = self.rest_query(Method::POST, "/users/@me/channels", &body).await?;
        let channel = serde_json::from_value::<DmChannel>(channel)
            .map_err(|e| DiscordError::JsonError(format!("DM channel response has no id. {e}")))?;
        Ok(channel.id)
    }

    pub async fn send_message(&self, channel_id: &str, body: &MessageBody) -> Result<(), DiscordError> {
        self.rest_query(Method::POST, &format!("/channels/{channel_id}/messages"), body).await?;
        Ok(())
    }
}

pub fn embed_message(title: &str, description: &str) -> MessageBody {
    let embed = Embed {
        title: title.to_string(),
        description: description.to_string(),
        color: EMBED_COLOUR,
        timestamp: Utc::now(),
    };
    MessageBody { content: None, embeds: vec![embed] }
}

pub fn text_message(content: &str) -> MessageBody {
    MessageBody { content: Some(content.to_string()), embeds: vec![] }
}

fn to_notifier_error(user: &str, e: DiscordError) -> NotifierError {
    if e.is_unreachable_recipient() {
        NotifierError::UnreachableRecipient(format!("{user}. {e}"))
    } else {
        NotifierError::DeliveryFailed(e.to_string())
    }
}

impl DepositNotifier for DiscordNotifier {
    async fn notify_user(&self, user: &str, title: &str, message: &str) -> Result<(), NotifierError> {
        let channel = self.open_dm_channel(user).await.map_err(|e| to_notifier_error(user, e))?;
        self.send_message(&channel, &embed_message(title, message)).await.map_err(|e| to_notifier_error(user, e))?;
        debug!("🔔️ Sent '{title}' to {user}");
        Ok(())
    }

    async fn post_log(&self, message: &str) -> Result<(), NotifierError> {
        self.send_message(&self.log_channel_id, &text_message(message))
            .await
            .map_err(|e| NotifierError::DeliveryFailed(e.to_string()))
    }
}
