use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::DomainError;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// A status code plus the `{"message": ...}` body every failed route returns.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Client mistakes keep their message; anything else is logged and
    /// reported as a 500 with `prefix` in front of the detail.
    pub fn from_domain(error: DomainError, prefix: &str) -> Self {
        match error {
            DomainError::Validation(msg) => Self::bad_request(msg),
            other => {
                tracing::error!(error = %other, "request failed");
                Self::internal(format!("{prefix}{other}"))
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(MessageResponse {
                message: self.message,
            }),
        )
            .into_response()
    }
}
