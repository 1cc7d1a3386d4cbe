//! Shared application state.

use std::sync::Arc;

use crate::relay::MessageRelay;
use crate::store::ConnectorStore;
use crate::telegram::TelegramApi;
use crate::Config;

/// Collaborators every request handler works with.
///
/// Configuration is immutable after start; the store and both HTTP clients
/// are safe to share across concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ConnectorStore>,
    pub telegram: Arc<dyn TelegramApi>,
    pub relay: Arc<dyn MessageRelay>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn ConnectorStore>,
        telegram: Arc<dyn TelegramApi>,
        relay: Arc<dyn MessageRelay>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            telegram,
            relay,
        }
    }
}
