//! HTTP error responses.
//!
//! Every handler failure becomes an [`ApiError`]; its [`IntoResponse`] impl
//! picks the status code and renders `{"error": {"code", "message"}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use livepipe_core::{AuthError, ValidationError};
use livepipe_hydrate::ServiceError;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Service(ServiceError::ListFacts(_)) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Store(_) | ServiceError::Unhydrated(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Service(ServiceError::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "BAD_REQUEST",
            Self::Auth(AuthError::Unavailable(_)) => "SESSION_STORE_ERROR",
            Self::Auth(_) => "UNAUTHORIZED",
            Self::Service(ServiceError::ListFacts(_)) => "NOT_FOUND",
            Self::Service(ServiceError::Store(_)) => "DATABASE_ERROR",
            Self::Service(ServiceError::Unhydrated(_)) => "INTERNAL_ERROR",
            Self::Service(ServiceError::Cancelled) => "CANCELLED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            debug!(status = status.as_u16(), error = %message, "request rejected");
        }

        let body = json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepipe_core::ReactionId;
    use livepipe_store::StoreError;

    #[test]
    fn status_mapping() {
        let cases = [
            (
                ApiError::from(ValidationError::InvalidLimit { value: "x".into() }),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::from(AuthError::Expired), StatusCode::UNAUTHORIZED),
            (
                ApiError::from(AuthError::Unavailable("pool".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(ServiceError::ListFacts(StoreError::Cancelled)),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(ServiceError::Store(StoreError::Migration {
                    message: "x".into(),
                })),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(ServiceError::Unhydrated(ReactionId::new(7))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(ValidationError::InvalidQuery("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(ServiceError::Cancelled),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ApiError::internal("join"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[tokio::test]
    async fn body_carries_code_and_message() {
        let resp = ApiError::from(ValidationError::InvalidId {
            field: "livestream_id",
            value: "abc".into(),
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["error"]["code"], "BAD_REQUEST");
        assert_eq!(
            parsed["error"]["message"],
            "livestream_id in path must be integer"
        );
    }
}
