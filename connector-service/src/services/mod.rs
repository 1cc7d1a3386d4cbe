//! Connector operations, independent of the HTTP layer.
//!
//! Each operation takes the shared [`AppState`](crate::AppState) plus the
//! already-extracted request parts and returns a [`ConnectorResult`].
//!
//! [`ConnectorResult`]: crate::error::ConnectorResult

pub mod auth;
pub mod connect;
pub mod manage;
pub mod secret;
pub mod send;
pub mod webhook;

pub use auth::{CallerCredentials, API_KEY_HEADER, USER_ID_HEADER};
pub use connect::{connect, ConnectRequest};
pub use manage::{delete_connector, list_connectors, DeleteConnectorOut};
pub use send::{send_message, SendMessageIn, SendMessageOut, MAX_TEXT_CHARS};
pub use webhook::{receive_update, WebhookOutcome, WebhookResponse};
