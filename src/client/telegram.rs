//! Telegram Bot API client, limited to sending plain text to one chat

use std::future::Future;

use compact_str::{CompactString, format_compact};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use super::{
    config::TelegramConfig,
    error::{ClientError, Result, error_chain},
};
use crate::id::ChatId;

/// Telegram refuses texts longer than this many characters
const MAX_MESSAGE_CHARS: usize = 4096;

/// Why a message did not reach the chat
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("sendMessage request failed: {detail}")]
    Transport {
        detail: CompactString,
        #[source]
        source: reqwest::Error,
    },

    #[error("sendMessage rejected: {description}")]
    Rejected { description: CompactString },

    #[error("sendMessage response could not be parsed: {detail}")]
    Decode {
        detail: CompactString,
        #[source]
        source: reqwest::Error,
    },
}

impl DeliveryError {
    // The request URL carries the bot token, keep it out of error messages.
    fn transport(source: reqwest::Error) -> Self {
        let source = source.without_url();
        Self::Transport { detail: error_chain(&source), source }
    }

    fn decode(source: reqwest::Error) -> Self {
        let source = source.without_url();
        Self::Decode { detail: error_chain(&source), source }
    }
}

/// Capability to deliver a text message to the configured chat
pub trait MessageSender: Send + Sync {
    fn send_message(
        &self,
        text: &str,
    ) -> impl Future<Output = std::result::Result<(), DeliveryError>> + Send;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a ChatId,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<CompactString>,
}

#[derive(Debug)]
pub struct TelegramBot {
    client: Client,
    send_url: CompactString,
    chat_id: ChatId,
}

impl TelegramBot {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Http)?;

        let send_url = format_compact!(
            "{}/bot{}/sendMessage",
            config.api_url.trim_end_matches('/'),
            config.bot_token
        );

        Ok(Self { client, send_url, chat_id: config.chat_id })
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    async fn send_chunk(&self, text: &str) -> std::result::Result<(), DeliveryError> {
        let payload = SendMessage { chat_id: &self.chat_id, text };

        let response = self
            .client
            .post(self.send_url.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(DeliveryError::transport)?;

        let body: TelegramResponse = response
            .json()
            .await
            .map_err(DeliveryError::decode)?;

        if !body.ok {
            return Err(DeliveryError::Rejected {
                description: body
                    .description
                    .unwrap_or_else(|| "sendMessage failed".into()),
            });
        }

        Ok(())
    }
}

impl MessageSender for TelegramBot {
    #[instrument(
        name = "send_message",
        skip(self, text),
        fields(chat_id = %self.chat_id, length = text.len())
    )]
    async fn send_message(&self, text: &str) -> std::result::Result<(), DeliveryError> {
        for chunk in chunks(text) {
            self.send_chunk(&chunk).await?;
        }
        debug!("Message delivered");
        Ok(())
    }
}

/// Split on character boundaries into Telegram-sized pieces
fn chunks(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(MAX_MESSAGE_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
