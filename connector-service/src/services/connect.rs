//! Connector registration.
//!
//! ```text
//! API key → owner id → secret → store (write) → Telegram setWebhook
//! ```
//!
//! A failed `setWebhook` leaves the stored connector in place; there is no
//! compensating delete.

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use super::auth::{authorize_caller, CallerCredentials};
use super::secret::generate_webhook_secret;
use crate::error::{ConnectorError, ConnectorResult};
use crate::store::{ConnectorView, NewConnector};
use crate::AppState;

/// Body of `POST /v1/telegram/connect`.
#[derive(Clone, Deserialize)]
pub struct ConnectRequest {
    pub bot_user_name: String,
    pub bot_token: String,
}

impl std::fmt::Debug for ConnectRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectRequest")
            .field("bot_user_name", &self.bot_user_name)
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

impl ConnectRequest {
    fn validate(&self) -> ConnectorResult<()> {
        if self.bot_user_name.trim().is_empty() {
            return Err(ConnectorError::InvalidPayload(
                "bot_user_name must not be empty".to_string(),
            ));
        }
        if self.bot_token.trim().is_empty() {
            return Err(ConnectorError::InvalidPayload(
                "bot_token must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Callback URL Telegram will deliver updates for `connector_id` to.
pub fn webhook_url(host: &url::Url, connector_id: Uuid) -> String {
    format!(
        "{}/v1/telegram/webhook/{}",
        host.as_str().trim_end_matches('/'),
        connector_id
    )
}

/// Register a connector and point the bot's webhook at this service.
pub async fn connect(
    state: &AppState,
    caller: &CallerCredentials,
    request: ConnectRequest,
) -> ConnectorResult<ConnectorView> {
    let user_id = authorize_caller(&state.config.api_key, caller)?;
    request.validate()?;

    let secret = generate_webhook_secret();

    let connector = state
        .store
        .create(NewConnector {
            user_id,
            bot_user_name: request.bot_user_name.trim().to_string(),
            bot_token: request.bot_token,
            bot_token_secret: secret,
        })
        .await
        .map_err(|e| {
            error!(error = %e, "connector_create_failed");
            ConnectorError::from(e)
        })?;

    info!(
        connector_id = %connector.id,
        user_id = %connector.user_id,
        bot_user_name = %connector.bot_user_name,
        "connector_created"
    );

    let callback = webhook_url(&state.config.host, connector.id);
    if let Err(e) = state
        .telegram
        .set_webhook(&connector.bot_token, &callback, &connector.bot_token_secret)
        .await
    {
        error!(
            connector_id = %connector.id,
            error = %e,
            "connector_webhook_registration_failed"
        );
        return Err(ConnectorError::RegistrationFailed(e.to_string()));
    }

    info!(connector_id = %connector.id, "connector_webhook_registered");

    Ok(ConnectorView::from(&connector))
}
