use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::config::TelegramConfig;
use crate::delivery::{Deliverer, DeliveryError};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const PARSE_MODE: &str = "HTML";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// The subset of a Bot API reply we look at.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts reports through the Telegram Bot API `sendMessage` method.
#[derive(Clone)]
pub struct TelegramDeliverer {
    client: Client,
    endpoint: Url,
    chat_id: String,
}

// The endpoint embeds the bot token; keep it out of Debug output.
impl std::fmt::Debug for TelegramDeliverer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramDeliverer")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramDeliverer {
    pub fn new(cfg: &TelegramConfig) -> Result<Self, DeliveryError> {
        // Not Url::join: the token contains ':' and would parse as a scheme.
        let mut endpoint = cfg.api_base.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| DeliveryError::Client(format!("{} cannot be a base", cfg.api_base)))?
            .pop_if_empty()
            .push(&format!("bot{}", cfg.token))
            .push("sendMessage");
        let client = ClientBuilder::new()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            chat_id: cfg.chat_id.clone(),
        })
    }
}

#[async_trait]
impl Deliverer for TelegramDeliverer {
    #[instrument(skip_all, fields(chat_id = %self.chat_id))]
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        let form = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: PARSE_MODE,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DeliveryError::Transport(e.without_url().to_string()))?;
        let reply = serde_json::from_str::<ApiReply>(&body).ok();

        match reply {
            Some(ApiReply { ok: true, .. }) if status.is_success() => {
                debug!("message accepted");
                Ok(())
            }
            Some(ApiReply { description, .. }) => Err(DeliveryError::Rejected {
                status,
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
            None if status.is_success() => Ok(()),
            None => Err(DeliveryError::Rejected {
                status,
                description: body.chars().take(200).collect(),
            }),
        }
    }
}
