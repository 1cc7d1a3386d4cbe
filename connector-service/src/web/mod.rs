//! HTTP surface of the connector service.
//!
//! ```text
//! GET    /                                       service name
//! GET    /health                                 liveness
//! POST   /v1/telegram/connect                    register a bot
//! POST   /v1/telegram/webhook/:connector_id      Telegram deliveries
//! POST   /v1/telegram/send/:connector_id         outbound message
//! GET    /v1/telegram/connectors                 caller's connectors
//! DELETE /v1/telegram/connectors/:bot_user_name  remove a connector
//! ```

pub mod envelope;
pub mod handlers;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use envelope::{ApiError, Envelope};

/// Build the application router with every route and the trace layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/v1/telegram/connect", post(handlers::connect_telegram))
        .route(
            "/v1/telegram/webhook/:connector_id",
            post(handlers::telegram_webhook),
        )
        .route(
            "/v1/telegram/send/:connector_id",
            post(handlers::send_message),
        )
        .route("/v1/telegram/connectors", get(handlers::list_connectors))
        .route(
            "/v1/telegram/connectors/:bot_user_name",
            delete(handlers::delete_connector),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
