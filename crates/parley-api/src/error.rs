//! Request failures and their HTTP mapping.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use parley_types::api::StatusMessage;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, blank or malformed input.
    #[error("{0}")]
    Validation(String),

    /// The referenced channel or member does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate channel id or member. Reported as 400, not 409.
    #[error("{0}")]
    Conflict(String),

    /// Store communication failure or anything unexpected.
    #[error("Internal server error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn channel_not_found() -> Self {
        ApiError::NotFound("Channel not found.".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid input, {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => StatusMessage::new(message),
            ApiError::Internal(err) => {
                error!("Request failed: {:#}", err);
                StatusMessage {
                    message: "Internal server error.".into(),
                    error: Some(format!("{:#}", err)),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
