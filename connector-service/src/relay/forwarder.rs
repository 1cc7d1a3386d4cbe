//! Best-effort HTTP relay of inbound messages.
//!
//! One POST per message with a bounded timeout. There is no retry and no
//! queue; the caller decides what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use super::types::InboundMessage;
use crate::services::auth::USER_ID_HEADER;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay request failed: {0}")]
    Transport(String),

    #[error("relay returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Destination for normalized inbound messages.
#[async_trait]
pub trait MessageRelay: Send + Sync {
    async fn relay(&self, message: &InboundMessage) -> Result<(), RelayError>;
}

/// Posts each message as JSON to the configured downstream URL.
#[derive(Clone)]
pub struct HttpRelay {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl HttpRelay {
    pub fn new(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }
}

#[async_trait]
impl MessageRelay for HttpRelay {
    async fn relay(&self, message: &InboundMessage) -> Result<(), RelayError> {
        info!(
            message_id = message.message_id,
            connector_id = %message.connector_id,
            timeout_seconds = self.timeout.as_secs_f64(),
            "relay_message_starting"
        );

        let response = self
            .client
            .post(self.url.clone())
            .header(USER_ID_HEADER, &message.user_id)
            .timeout(self.timeout)
            .json(message)
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(e) => {
                if e.is_timeout() {
                    error!(
                        timeout_seconds = self.timeout.as_secs_f64(),
                        error = %e,
                        "relay_message_timeout"
                    );
                } else {
                    error!(error = %e, "relay_message_error");
                }
                return Err(RelayError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            error!(
                status_code = status.as_u16(),
                body_preview = %preview,
                "relay_message_rejected"
            );
            return Err(RelayError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        info!(status_code = status.as_u16(), "relay_message_delivered");
        Ok(())
    }
}
