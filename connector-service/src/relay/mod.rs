//! Downstream relay of normalized inbound messages.
//!
//! ## Flow
//!
//! ```text
//! Telegram → webhook → InboundMessage → MessageRelay → downstream backend
//! ```

pub mod forwarder;
pub mod types;

pub use forwarder::{HttpRelay, MessageRelay, RelayError};
pub use types::InboundMessage;
