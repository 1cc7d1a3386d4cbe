//! Message format sent to the downstream backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized representation of one Telegram message.
///
/// `user_id`, `bot_user_name` and `connector_id` always come from the stored
/// connector, never from the webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub date: DateTime<Utc>,
    pub message_id: i64,
    pub chat_id: i64,
    pub text: Option<String>,
    pub caption: Option<String>,
    /// File ids of every photo size Telegram attached
    pub photo: Option<Vec<String>>,
    /// Sticker file id
    pub sticker: Option<String>,

    pub user_id: String,
    pub bot_user_name: String,
    pub connector_id: Uuid,
}
