//! Inbound webhook ingestion.
//!
//! Telegram must receive a 200 once a delivery authenticates, whatever
//! happens downstream. Only an unknown connector (404) or a bad secret (403)
//! produce an error response.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::secret::secrets_match;
use crate::error::{ConnectorError, ConnectorResult};
use crate::relay::InboundMessage;
use crate::store::Connector;
use crate::telegram::{Message, Update};
use crate::AppState;

/// What happened to an authenticated delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A message was normalized and a relay was attempted.
    Accepted { relayed: bool },
    /// The update carried no message we handle.
    Ignored,
}

impl WebhookOutcome {
    pub fn status(self) -> &'static str {
        match self {
            Self::Accepted { .. } => "ok",
            Self::Ignored => "ignored",
        }
    }
}

/// Body returned to Telegram.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
}

impl From<WebhookOutcome> for WebhookResponse {
    fn from(outcome: WebhookOutcome) -> Self {
        Self {
            status: outcome.status(),
        }
    }
}

/// Build the normalized message for `connector`.
///
/// Returns `None` when the message lacks its id or chat.
pub fn normalize_message(connector: &Connector, message: Message) -> Option<InboundMessage> {
    let message_id = message.message_id?;
    let chat_id = message.chat.as_ref()?.id?;
    let date = DateTime::<Utc>::from_timestamp(message.date.unwrap_or(0), 0).unwrap_or_default();

    Some(InboundMessage {
        date,
        message_id,
        chat_id,
        photo: message.photo_file_ids(),
        sticker: message.sticker_file_id(),
        text: message.text,
        caption: message.caption,
        user_id: connector.user_id.clone(),
        bot_user_name: connector.bot_user_name.clone(),
        connector_id: connector.id,
    })
}

/// Authenticate and process one webhook delivery.
pub async fn receive_update(
    state: &AppState,
    connector_id: &str,
    secret_token: Option<&str>,
    body: &[u8],
) -> ConnectorResult<WebhookOutcome> {
    info!(connector_id = %connector_id, body_length = body.len(), "webhook_received");

    let id = Uuid::parse_str(connector_id).map_err(|_| {
        warn!(connector_id = %connector_id, "webhook_connector_id_invalid");
        ConnectorError::NotFound
    })?;

    let connector = state.store.get_by_id(id).await?.ok_or_else(|| {
        warn!(connector_id = %id, "webhook_connector_not_found");
        ConnectorError::NotFound
    })?;

    match secret_token {
        Some(provided) if secrets_match(&connector.bot_token_secret, provided) => {
            debug!(connector_id = %connector.id, "webhook_secret_verified");
        }
        Some(_) => {
            warn!(connector_id = %connector.id, "webhook_secret_invalid");
            return Err(ConnectorError::InvalidSecret);
        }
        None => {
            warn!(connector_id = %connector.id, "webhook_secret_missing");
            return Err(ConnectorError::InvalidSecret);
        }
    }

    let update: Update = match serde_json::from_slice(body) {
        Ok(update) => update,
        Err(e) => {
            warn!(connector_id = %connector.id, error = %e, "webhook_body_unparseable");
            return Ok(WebhookOutcome::Ignored);
        }
    };
    let update_id = update.update_id;

    let Some(message) = update.into_message() else {
        info!(connector_id = %connector.id, update_id = ?update_id, "webhook_update_ignored");
        return Ok(WebhookOutcome::Ignored);
    };

    let Some(inbound) = normalize_message(&connector, message) else {
        warn!(
            connector_id = %connector.id,
            update_id = ?update_id,
            "webhook_message_incomplete"
        );
        return Ok(WebhookOutcome::Ignored);
    };

    info!(
        connector_id = %connector.id,
        message_id = inbound.message_id,
        chat_id = inbound.chat_id,
        user_id = %inbound.user_id,
        has_text = inbound.text.is_some(),
        has_photo = inbound.photo.is_some(),
        "webhook_message_normalized"
    );

    // Downstream failures are logged by the relay and never reach Telegram.
    let relayed = match state.relay.relay(&inbound).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                connector_id = %connector.id,
                message_id = inbound.message_id,
                error = %e,
                "webhook_relay_failed"
            );
            false
        }
    };

    Ok(WebhookOutcome::Accepted { relayed })
}
