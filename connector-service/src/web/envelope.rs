//! Response envelope shared by every management endpoint.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::error::ConnectorError;

/// `{success, message, data, trace_id}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub trace_id: Uuid,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T, trace_id: Uuid) -> Self {
        Self {
            success: true,
            message: "Operation successful".to_string(),
            data,
            trace_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InternalErrorBody {
    pub code: u32,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorData {
    pub internal_error: InternalErrorBody,
    pub details: ErrorDetails,
}

/// A [`ConnectorError`] bound to the trace id of the failing request.
#[derive(Debug)]
pub struct ApiError {
    pub error: ConnectorError,
    pub trace_id: Uuid,
}

impl ApiError {
    pub fn new(error: ConnectorError, trace_id: Uuid) -> Self {
        Self { error, trace_id }
    }
}

/// Detail string safe to hand back to the caller.
fn public_detail(err: &ConnectorError) -> String {
    match err {
        ConnectorError::InvalidPayload(detail)
        | ConnectorError::RegistrationFailed(detail)
        | ConnectorError::Upstream(detail) => detail.clone(),
        ConnectorError::Store(source) => {
            error!(error = %source, "store_error");
            err.to_string()
        }
        ConnectorError::Internal(detail) => {
            error!(error = %detail, "internal_error");
            err.to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let code = self.error.internal_code();

        let body = Envelope {
            success: false,
            message: self.error.to_string(),
            data: ErrorData {
                internal_error: InternalErrorBody {
                    code: code.code(),
                    description: code.description(),
                },
                details: ErrorDetails {
                    detail: public_detail(&self.error),
                },
            },
            trace_id: self.trace_id,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    async fn render(err: ConnectorError) -> (StatusCode, serde_json::Value) {
        let response = ApiError::new(err, Uuid::nil()).into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_envelope_shape() {
        let (status, body) = render(ConnectorError::NotOwner).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Connector does not belong to this user");
        assert_eq!(body["data"]["internal_error"]["code"], 2005);
        assert_eq!(
            body["data"]["details"]["detail"],
            "Connector does not belong to this user"
        );
        assert_eq!(body["trace_id"], Uuid::nil().to_string());
    }

    #[tokio::test]
    async fn test_upstream_detail_is_provider_description() {
        let (status, body) =
            render(ConnectorError::Upstream("Bad Request: chat not found".to_string())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["data"]["details"]["detail"], "Bad Request: chat not found");
    }

    #[tokio::test]
    async fn test_store_errors_are_generic() {
        let source = StoreError::Sqlite(rusqlite::Error::InvalidQuery);
        let (status, body) = render(ConnectorError::Store(source)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["data"]["details"]["detail"], "Connector store error");

        let (_, body) = render(ConnectorError::Internal("db path /secret".to_string())).await;
        assert_eq!(body["data"]["details"]["detail"], "Internal server error");
        assert_eq!(body["data"]["internal_error"]["code"], 100);
    }

    #[test]
    fn test_ok_envelope() {
        let envelope = Envelope::ok(serde_json::json!({"deleted": true}), Uuid::nil());
        let rendered = serde_json::to_value(&envelope).unwrap();

        assert_eq!(rendered["success"], true);
        assert_eq!(rendered["message"], "Operation successful");
        assert_eq!(rendered["data"]["deleted"], true);
    }
}
