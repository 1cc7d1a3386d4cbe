//! Owner-scoped connector listing and removal.

use serde::Serialize;
use tracing::{info, warn};

use super::auth::{authorize_caller, CallerCredentials};
use crate::error::{ConnectorError, ConnectorResult};
use crate::store::ConnectorView;
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteConnectorOut {
    pub deleted: bool,
}

/// Connectors owned by the caller.
pub async fn list_connectors(
    state: &AppState,
    caller: &CallerCredentials,
) -> ConnectorResult<Vec<ConnectorView>> {
    let user_id = authorize_caller(&state.config.api_key, caller)?;
    let connectors = state.store.get_by_owner(&user_id).await?;

    info!(user_id = %user_id, count = connectors.len(), "connectors_listed");
    Ok(connectors.iter().map(ConnectorView::from).collect())
}

/// Delete the caller's connector registered under `bot_user_name`.
///
/// The Telegram webhook itself is left in place.
pub async fn delete_connector(
    state: &AppState,
    caller: &CallerCredentials,
    bot_user_name: &str,
) -> ConnectorResult<DeleteConnectorOut> {
    let user_id = authorize_caller(&state.config.api_key, caller)?;

    let owned = state
        .store
        .get_by_owner(&user_id)
        .await?
        .into_iter()
        .any(|c| c.bot_user_name == bot_user_name);
    if !owned {
        warn!(user_id = %user_id, bot_user_name = %bot_user_name, "connector_delete_not_owned");
        return Err(ConnectorError::NotFound);
    }

    if !state.store.delete_by_bot_name(bot_user_name).await? {
        return Err(ConnectorError::NotFound);
    }

    info!(user_id = %user_id, bot_user_name = %bot_user_name, "connector_deleted");
    Ok(DeleteConnectorOut { deleted: true })
}
