//! API errors and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dataplane_spi::StatusFailure;
use serde_json::{Value, json};
use thiserror::Error;
use transform_core::TransformFailure;

/// Failure answered by the signaling API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request cannot be served as sent.
    #[error("Invalid request: {}", .0.join(", "))]
    InvalidRequest(Vec<String>),

    /// The operation exists but is not supported.
    #[error("Not Implemented: {0}")]
    NotImplemented(String),

    /// The request was valid but the server failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Invalid request with one message.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(vec![message.into()])
    }

    /// Only server-side failures may succeed when sent again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::NotImplemented(_) => "NotImplemented",
            Self::Internal(_) => "InternalError",
        }
    }

    /// Error array body: one entry per message.
    #[must_use]
    pub fn body(&self) -> Value {
        let messages = match self {
            Self::InvalidRequest(messages) => messages.clone(),
            Self::NotImplemented(_) | Self::Internal(_) => vec![self.to_string()],
        };
        let error_type = self.error_type();
        Value::Array(
            messages
                .into_iter()
                .map(|message| json!({ "message": message, "type": error_type }))
                .collect(),
        )
    }
}

impl From<TransformFailure> for ApiError {
    fn from(failure: TransformFailure) -> Self {
        Self::InvalidRequest(failure.messages)
    }
}

impl From<StatusFailure> for ApiError {
    fn from(failure: StatusFailure) -> Self {
        Self::InvalidRequest(failure.messages)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
