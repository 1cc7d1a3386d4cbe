//! Outbound send gateway.

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use super::auth::{authorize_caller, check_ownership, CallerCredentials};
use crate::error::{ConnectorError, ConnectorResult};
use crate::AppState;

/// Telegram's own limit for a message text, in characters.
pub const MAX_TEXT_CHARS: usize = 4096;

/// Body of `POST /v1/telegram/send/{connector_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageIn {
    pub chat_id: i64,
    pub text: String,
}

impl SendMessageIn {
    pub fn validate(&self) -> ConnectorResult<()> {
        let chars = self.text.chars().count();
        if chars == 0 || chars > MAX_TEXT_CHARS {
            return Err(ConnectorError::InvalidPayload(format!(
                "text must be between 1 and {MAX_TEXT_CHARS} characters, got {chars}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessageOut {
    pub telegram_message_id: i64,
    pub status: &'static str,
}

/// Send `request.text` to `request.chat_id` through the caller's connector.
pub async fn send_message(
    state: &AppState,
    caller: &CallerCredentials,
    connector_id: &str,
    request: SendMessageIn,
) -> ConnectorResult<SendMessageOut> {
    let user_id = authorize_caller(&state.config.api_key, caller)?;
    request.validate()?;

    let id = Uuid::parse_str(connector_id).map_err(|_| {
        ConnectorError::InvalidPayload(format!("connector id {connector_id} is not a valid UUID"))
    })?;

    let connector = state
        .store
        .get_by_id(id)
        .await?
        .ok_or(ConnectorError::NotFound)?;

    check_ownership(&connector, &user_id)?;

    info!(
        connector_id = %connector.id,
        chat_id = request.chat_id,
        bot_user_name = %connector.bot_user_name,
        text_length = request.text.chars().count(),
        "send_message_start"
    );

    let sent = state
        .telegram
        .send_message(&connector.bot_token, request.chat_id, &request.text)
        .await
        .map_err(|e| {
            error!(connector_id = %connector.id, error = %e, "send_message_failed");
            ConnectorError::Upstream(e.to_string())
        })?;

    info!(
        connector_id = %connector.id,
        telegram_message_id = sent.message_id,
        "send_message_complete"
    );

    Ok(SendMessageOut {
        telegram_message_id: sent.message_id,
        status: "sent",
    })
}
