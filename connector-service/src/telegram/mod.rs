//! Telegram Bot API integration.
//!
//! - `types`: update and response payloads
//! - `client`: the [`TelegramApi`] seam and its HTTP implementation

pub mod client;
pub mod types;

pub use client::{HttpTelegramClient, TelegramApi, TelegramError};
pub use types::{Message, SentMessage, Update, SECRET_TOKEN_HEADER};
