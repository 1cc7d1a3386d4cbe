//! Error taxonomy shared by every connector operation.
//!
//! Each variant carries a human readable detail that is safe to return to
//! the caller. Secrets and bot credentials never end up in a detail string.

use axum::http::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

/// Machine readable error codes reported in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalCode {
    Unknown,
    RequestValidation,
    MissingHeader,
    InvalidApiKey,
    ConnectorNotFound,
    InvalidWebhookSecret,
    ConnectorOwnershipMismatch,
    DuplicateBotName,
    WebhookRegistrationFailed,
    TelegramApiError,
    StoreError,
}

impl InternalCode {
    pub fn code(self) -> u32 {
        match self {
            Self::Unknown => 100,
            Self::RequestValidation => 8001,
            Self::MissingHeader => 2001,
            Self::InvalidApiKey => 2002,
            Self::ConnectorNotFound => 2003,
            Self::InvalidWebhookSecret => 2004,
            Self::ConnectorOwnershipMismatch => 2005,
            Self::DuplicateBotName => 2006,
            Self::WebhookRegistrationFailed => 2007,
            Self::TelegramApiError => 2008,
            Self::StoreError => 2009,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown error",
            Self::RequestValidation => "Failed validations on request",
            Self::MissingHeader => "Required header missing",
            Self::InvalidApiKey => "Invalid API key",
            Self::ConnectorNotFound => "Telegram connector not found",
            Self::InvalidWebhookSecret => "Invalid webhook secret",
            Self::ConnectorOwnershipMismatch => "Connector belongs to another user",
            Self::DuplicateBotName => "Bot user name already connected",
            Self::WebhookRegistrationFailed => "Telegram webhook registration failed",
            Self::TelegramApiError => "Telegram API error",
            Self::StoreError => "Connector store error",
        }
    }
}

/// Errors produced by registration, webhook ingestion and send operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// A required header is absent or blank.
    #[error("{0} is required")]
    MissingHeader(&'static str),

    /// Request body or path failed validation.
    #[error("Invalid request: {0}")]
    InvalidPayload(String),

    /// API key absent or not matching the configured key.
    #[error("Invalid API Key")]
    Unauthorized,

    /// Webhook secret absent or not matching the connector's secret.
    #[error("Invalid secret")]
    InvalidSecret,

    /// Caller does not own the connector it addresses.
    #[error("Connector does not belong to this user")]
    NotOwner,

    #[error("Telegram connector not found")]
    NotFound,

    #[error("Bot user name {0} is already connected")]
    Conflict(String),

    /// Telegram did not accept the webhook registration.
    #[error("Error connecting with Telegram: {0}")]
    RegistrationFailed(String),

    /// Telegram rejected or failed an outbound call.
    #[error("Telegram API error: {0}")]
    Upstream(String),

    #[error("Connector store error")]
    Store(#[source] StoreError),

    #[error("Internal server error")]
    Internal(String),
}

impl ConnectorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingHeader(_) | Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidSecret | Self::NotOwner => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RegistrationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal_code(&self) -> InternalCode {
        match self {
            Self::MissingHeader(_) => InternalCode::MissingHeader,
            Self::InvalidPayload(_) => InternalCode::RequestValidation,
            Self::Unauthorized => InternalCode::InvalidApiKey,
            Self::InvalidSecret => InternalCode::InvalidWebhookSecret,
            Self::NotOwner => InternalCode::ConnectorOwnershipMismatch,
            Self::NotFound => InternalCode::ConnectorNotFound,
            Self::Conflict(_) => InternalCode::DuplicateBotName,
            Self::RegistrationFailed(_) => InternalCode::WebhookRegistrationFailed,
            Self::Upstream(_) => InternalCode::TelegramApiError,
            Self::Store(_) => InternalCode::StoreError,
            Self::Internal(_) => InternalCode::Unknown,
        }
    }
}

impl From<StoreError> for ConnectorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(name) => Self::Conflict(name),
            other => Self::Store(other),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
