//! Telegram connector service.
//!
//! Lets users register their own Telegram bots, receives the bots' webhook
//! deliveries and forwards normalized messages downstream, and sends
//! outbound messages on the owner's behalf.
//!
//! ## Architecture
//!
//! ```text
//! Telegram → /v1/telegram/webhook/{id} → verify secret → normalize → relay
//! Caller   → /v1/telegram/send/{id}    → verify owner  → Bot API sendMessage
//! ```

pub mod config;
pub mod error;
pub mod relay;
pub mod services;
pub mod state;
pub mod store;
pub mod telegram;
pub mod web;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use error::{ConnectorError, ConnectorResult};
pub use relay::{HttpRelay, InboundMessage, MessageRelay};
pub use state::AppState;
pub use store::{ConnectorStore, SqliteConnectorStore};
pub use telegram::{HttpTelegramClient, TelegramApi};
pub use web::router;
