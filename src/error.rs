use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::response::Envelope;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("User Already Registered")]
    AlreadyRegistered,

    /// Role check failed. Reported as 400, never 403.
    #[error("Only Admin is Allowed to Access this Page!")]
    Forbidden,

    #[error("Login First")]
    LoginFirst,

    #[error("Invalid or expired session")]
    InvalidToken,

    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("Invalid or Expired Token")]
    InvalidOrExpiredResetToken,

    #[error("User Not Found")]
    UserNotFound,

    #[error("{0} Not Found")]
    NotFound(&'static str),

    /// Rendered with its full context chain.
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::AlreadyRegistered | Self::Forbidden => {
                StatusCode::BAD_REQUEST
            }
            Self::LoginFirst
            | Self::InvalidToken
            | Self::InvalidCredentials
            | Self::InvalidOrExpiredResetToken => StatusCode::UNAUTHORIZED,
            Self::UserNotFound | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let text = self.to_string();

        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }
        // Server faults and the admin denial report under `error`.
        let body = match self {
            Self::Internal(_) | Self::Forbidden => Envelope::failure_error(text),
            _ => Envelope::failure(text),
        };

        (status, Json(body)).into_response()
    }
}
