//! HTTP endpoint handlers.
//!
//! Handlers only extract request parts, assign a trace id and hand over to
//! [`crate::services`]. Management endpoints answer with an [`Envelope`];
//! the Telegram webhook answers with a bare `{status}` on success.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use super::envelope::{ApiError, Envelope};
use crate::error::ConnectorError;
use crate::services::{
    self, CallerCredentials, ConnectRequest, DeleteConnectorOut, SendMessageIn, SendMessageOut,
    WebhookResponse,
};
use crate::store::ConnectorView;
use crate::telegram::SECRET_TOKEN_HEADER;
use crate::AppState;

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Generic description of a JSON rejection.
///
/// serde's own messages quote the offending value, which may be a bot token,
/// so they are neither logged nor returned.
fn rejection_detail(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonDataError(_) => "request body has missing or invalid fields",
        JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
        JsonRejection::MissingJsonContentType(_) => "expected `Content-Type: application/json`",
        _ => "request body could not be read",
    }
}

/// Turn axum's JSON rejection into a request validation error.
fn json_body<T>(body: Result<Json<T>, JsonRejection>, trace_id: Uuid) -> Result<T, ApiError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        let detail = rejection_detail(&rejection);
        warn!(
            trace_id = %trace_id,
            status_code = rejection.status().as_u16(),
            detail = detail,
            "request_body_rejected"
        );
        ApiError::new(ConnectorError::InvalidPayload(detail.to_string()), trace_id)
    })
}

// =============================================================================
// Service info
// =============================================================================

#[derive(Serialize)]
pub struct IndexResponse {
    pub message: String,
}

pub async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        message: state.config.project_name.clone(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "OK",
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

// =============================================================================
// Registration
// =============================================================================

/// `POST /v1/telegram/connect`
pub async fn connect_telegram(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ConnectRequest>, JsonRejection>,
) -> ApiResult<ConnectorView> {
    let trace_id = Uuid::new_v4();
    let request = json_body(body, trace_id)?;
    let caller = CallerCredentials::from_headers(&headers);

    services::connect(&state, &caller, request)
        .instrument(info_span!("connect_telegram", trace_id = %trace_id))
        .await
        .map(|view| Json(Envelope::ok(view, trace_id)))
        .map_err(|e| ApiError::new(e, trace_id))
}

// =============================================================================
// Telegram webhook
// =============================================================================

/// `POST /v1/telegram/webhook/{connector_id}`
///
/// The body is taken raw so an unparseable update can still be answered
/// with 200 once the secret checks out.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    Path(connector_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let trace_id = Uuid::new_v4();
    let secret_token = headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    services::receive_update(&state, &connector_id, secret_token, &body)
        .instrument(info_span!("telegram_webhook", trace_id = %trace_id))
        .await
        .map(|outcome| Json(WebhookResponse::from(outcome)))
        .map_err(|e| ApiError::new(e, trace_id))
}

// =============================================================================
// Outbound send
// =============================================================================

/// `POST /v1/telegram/send/{connector_id}`
pub async fn send_message(
    State(state): State<AppState>,
    Path(connector_id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<SendMessageIn>, JsonRejection>,
) -> ApiResult<SendMessageOut> {
    let trace_id = Uuid::new_v4();
    let request = json_body(body, trace_id)?;
    let caller = CallerCredentials::from_headers(&headers);

    services::send_message(&state, &caller, &connector_id, request)
        .instrument(info_span!("send_message", trace_id = %trace_id))
        .await
        .map(|out| Json(Envelope::ok(out, trace_id)))
        .map_err(|e| ApiError::new(e, trace_id))
}

// =============================================================================
// Management
// =============================================================================

/// `GET /v1/telegram/connectors`
pub async fn list_connectors(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Vec<ConnectorView>> {
    let trace_id = Uuid::new_v4();
    let caller = CallerCredentials::from_headers(&headers);

    services::list_connectors(&state, &caller)
        .instrument(info_span!("list_connectors", trace_id = %trace_id))
        .await
        .map(|views| Json(Envelope::ok(views, trace_id)))
        .map_err(|e| ApiError::new(e, trace_id))
}

/// `DELETE /v1/telegram/connectors/{bot_user_name}`
pub async fn delete_connector(
    State(state): State<AppState>,
    Path(bot_user_name): Path<String>,
    headers: HeaderMap,
) -> ApiResult<DeleteConnectorOut> {
    let trace_id = Uuid::new_v4();
    let caller = CallerCredentials::from_headers(&headers);

    services::delete_connector(&state, &caller, &bot_user_name)
        .instrument(info_span!("delete_connector", trace_id = %trace_id))
        .await
        .map(|out| Json(Envelope::ok(out, trace_id)))
        .map_err(|e| ApiError::new(e, trace_id))
}
