//! Trust checks shared by the management endpoints.
//!
//! The owner id arrives in `X-User-Id` and is taken at face value; verifying
//! it against an identity provider happens before requests reach this
//! service.

use axum::http::HeaderMap;
use tracing::warn;

use super::secret::secrets_match;
use crate::error::{ConnectorError, ConnectorResult};
use crate::store::Connector;

pub const API_KEY_HEADER: &str = "X-Api-Key";
/// Owner id header, also sent on every relay call.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Caller-supplied credentials of a management request.
#[derive(Clone, Default)]
pub struct CallerCredentials {
    pub api_key: Option<String>,
    pub user_id: Option<String>,
}

impl CallerCredentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            api_key: read(API_KEY_HEADER),
            user_id: read(USER_ID_HEADER),
        }
    }
}

/// Check the API key, then require an owner id. Returns the owner id.
pub fn authorize_caller(
    expected_api_key: &str,
    caller: &CallerCredentials,
) -> ConnectorResult<String> {
    check_api_key(expected_api_key, caller.api_key.as_deref())?;
    require_owner(caller.user_id.as_deref())
}

pub fn check_api_key(expected: &str, provided: Option<&str>) -> ConnectorResult<()> {
    match provided {
        Some(key) if secrets_match(expected, key) => Ok(()),
        Some(_) => {
            warn!("api_key_invalid");
            Err(ConnectorError::Unauthorized)
        }
        None => {
            warn!("api_key_missing");
            Err(ConnectorError::Unauthorized)
        }
    }
}

pub fn require_owner(user_id: Option<&str>) -> ConnectorResult<String> {
    match user_id {
        Some(id) if !id.trim().is_empty() => Ok(id.to_string()),
        _ => {
            warn!(header = USER_ID_HEADER, "header_missing");
            Err(ConnectorError::MissingHeader(USER_ID_HEADER))
        }
    }
}

/// The connector must belong to the caller.
pub fn check_ownership(connector: &Connector, user_id: &str) -> ConnectorResult<()> {
    if connector.user_id != user_id {
        warn!(
            connector_id = %connector.id,
            caller_user_id = %user_id,
            "connector_ownership_mismatch"
        );
        return Err(ConnectorError::NotOwner);
    }
    Ok(())
}
