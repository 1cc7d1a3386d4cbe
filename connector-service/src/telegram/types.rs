//! Telegram Bot API payload types.
//!
//! Only the fields this service reads are modelled. Inbound fields are parsed
//! one at a time: a field that is absent, null or of an unexpected shape
//! becomes `None` instead of failing the whole update.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

/// Header Telegram uses to echo the webhook secret on every delivery.
pub const SECRET_TOKEN_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Deserialize a field as `Some(T)` when it has the expected shape, `None` otherwise.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// An incoming update as delivered to a webhook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    #[serde(default, deserialize_with = "lenient")]
    pub update_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<Message>,
    #[serde(default, deserialize_with = "lenient")]
    pub edited_message: Option<Message>,
}

impl Update {
    /// The new or edited message carried by this update, if any.
    pub fn into_message(self) -> Option<Message> {
        self.message.or(self.edited_message)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "lenient")]
    pub message_id: Option<i64>,
    /// Unix seconds
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub chat: Option<Chat>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default, deserialize_with = "lenient")]
    pub sticker: Option<Sticker>,
}

impl Message {
    /// File ids of every well-formed photo size; `None` when there are none.
    pub fn photo_file_ids(&self) -> Option<Vec<String>> {
        let ids: Vec<String> = self
            .photo
            .iter()
            .flatten()
            .filter_map(|size| size.file_id.clone())
            .collect();
        (!ids.is_empty()).then_some(ids)
    }

    pub fn sticker_file_id(&self) -> Option<String> {
        self.sticker.as_ref().and_then(|s| s.file_id.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chat {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoSize {
    #[serde(default, deserialize_with = "lenient")]
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sticker {
    #[serde(default, deserialize_with = "lenient")]
    pub file_id: Option<String>,
}

/// Body of a `setWebhook` call.
#[derive(Debug, Serialize)]
pub struct SetWebhookRequest<'a> {
    pub url: &'a str,
    pub secret_token: &'a str,
}

/// Body of a `sendMessage` call.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

/// The part of a sent message the gateway reports back.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}
