//! Telegram Bot API client.
//!
//! The bot token is part of every request URL, so nothing in this module
//! logs a URL, and transport errors are stripped of theirs before they
//! leave the client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use super::types::{ApiResponse, SendMessageRequest, SentMessage, SetWebhookRequest};

/// Errors from a Bot API call.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("request to Telegram failed: {0}")]
    Transport(String),

    /// Telegram answered with `ok: false`.
    #[error("{0}")]
    Rejected(String),

    /// Non-success HTTP status without a decodable error body.
    #[error("Telegram returned status {0}")]
    Status(StatusCode),

    #[error("unexpected Telegram response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::Transport("timed out".to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Outbound calls made on behalf of a bot.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// Point the bot's webhook at `url`, asking Telegram to echo `secret_token`.
    async fn set_webhook(
        &self,
        bot_token: &str,
        url: &str,
        secret_token: &str,
    ) -> Result<(), TelegramError>;

    async fn send_message(
        &self,
        bot_token: &str,
        chat_id: i64,
        text: &str,
    ) -> Result<SentMessage, TelegramError>;
}

/// reqwest implementation of [`TelegramApi`].
#[derive(Clone)]
pub struct HttpTelegramClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTelegramClient {
    pub fn new(client: Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            timeout,
        }
    }

    fn method_url(&self, bot_token: &str, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            bot_token,
            method
        )
    }

    async fn call<B, T>(&self, bot_token: &str, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(bot_token, method))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let err = TelegramError::from(e);
                error!(method = method, error = %err, "telegram_request_failed");
                err
            })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        debug!(
            method = method,
            status_code = status.as_u16(),
            body_length = bytes.len(),
            "telegram_response_received"
        );

        let parsed: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                error!(method = method, error = %e, "telegram_response_decode_failed");
                return Err(TelegramError::Decode(e.to_string()));
            }
            Err(_) => {
                error!(method = method, status_code = status.as_u16(), "telegram_status_error");
                return Err(TelegramError::Status(status));
            }
        };

        if !parsed.ok {
            let description = parsed
                .description
                .unwrap_or_else(|| "Unknown error".to_string());
            error!(
                method = method,
                status_code = status.as_u16(),
                error_code = ?parsed.error_code,
                description = %description,
                "telegram_request_rejected"
            );
            return Err(TelegramError::Rejected(description));
        }

        if !status.is_success() {
            return Err(TelegramError::Status(status));
        }

        parsed
            .result
            .ok_or_else(|| TelegramError::Decode(format!("{method} response has no result")))
    }
}

#[async_trait]
impl TelegramApi for HttpTelegramClient {
    async fn set_webhook(
        &self,
        bot_token: &str,
        url: &str,
        secret_token: &str,
    ) -> Result<(), TelegramError> {
        info!("telegram_set_webhook_start");
        let accepted: bool = self
            .call(bot_token, "setWebhook", &SetWebhookRequest { url, secret_token })
            .await?;

        if !accepted {
            return Err(TelegramError::Rejected("webhook was not set".to_string()));
        }

        info!("telegram_set_webhook_complete");
        Ok(())
    }

    async fn send_message(
        &self,
        bot_token: &str,
        chat_id: i64,
        text: &str,
    ) -> Result<SentMessage, TelegramError> {
        let sent: SentMessage = self
            .call(bot_token, "sendMessage", &SendMessageRequest { chat_id, text })
            .await?;

        info!(
            chat_id = chat_id,
            telegram_message_id = sent.message_id,
            "telegram_send_message_complete"
        );
        Ok(sent)
    }
}
