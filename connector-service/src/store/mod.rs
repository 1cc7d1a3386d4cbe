//! Connector persistence.
//!
//! The [`ConnectorStore`] trait is the only way the rest of the service
//! touches persisted connectors. Every call is one unit of work: the
//! underlying session is acquired, a single statement runs, and the session
//! is released before the call returns.
//!
//! Lookups report "not found" as `None` or `false`, never as an error.

pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub use sqlite::SqliteConnectorStore;

/// Errors raised by a connector store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another connector already uses this bot user name.
    #[error("bot user name {0} is already registered")]
    Duplicate(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The blocking task running a statement panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(String),
}

/// A registered binding between an owning user and a bot credential/secret pair.
#[derive(Clone, PartialEq)]
pub struct Connector {
    pub id: Uuid,
    /// Owner id as asserted by the caller at registration time
    pub user_id: String,
    pub bot_user_name: String,
    /// Bot API credential, write-only from the API's perspective
    pub bot_token: String,
    /// Webhook secret shared once with Telegram
    pub bot_token_secret: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// Credentials must never reach a log line through `{:?}`.
impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("bot_user_name", &self.bot_user_name)
            .field("bot_token", &"<redacted>")
            .field("bot_token_secret", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deleted_at", &self.deleted_at)
            .finish()
    }
}

/// Values needed to create a connector.
#[derive(Clone)]
pub struct NewConnector {
    pub user_id: String,
    pub bot_user_name: String,
    pub bot_token: String,
    pub bot_token_secret: String,
}

/// Public-safe projection of a connector. Credential and secret are absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorView {
    pub id: Uuid,
    pub user_id: String,
    pub bot_user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Connector> for ConnectorView {
    fn from(connector: &Connector) -> Self {
        Self {
            id: connector.id,
            user_id: connector.user_id.clone(),
            bot_user_name: connector.bot_user_name.clone(),
            created_at: connector.created_at,
            updated_at: connector.updated_at,
        }
    }
}

/// Persistence contract for connector records.
#[async_trait]
pub trait ConnectorStore: Send + Sync {
    /// Persist a new connector, assigning its id and timestamps.
    async fn create(&self, new: NewConnector) -> Result<Connector, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Connector>, StoreError>;

    async fn get_by_owner(&self, user_id: &str) -> Result<Vec<Connector>, StoreError>;

    async fn get_all(&self) -> Result<Vec<Connector>, StoreError>;

    /// Delete the connector registered under `bot_user_name`.
    ///
    /// Returns `false` when no connector matched.
    async fn delete_by_bot_name(&self, bot_user_name: &str) -> Result<bool, StoreError>;
}
