//! Error type shared by the stores and the HTTP handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The caller broke an operation's contract (bad index, bad input).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A lookup by id found nothing.
    #[error("{0} not found")]
    NotFound(String),

    /// The key-value backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A snapshot could not be encoded for storage.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
