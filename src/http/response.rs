//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map subsystem errors to HTTP status codes
//! - Render every error with the same JSON envelope
//!
//! # Design Decisions
//! - Envelope is `{"code": <status>, "message": <text>, "data": {}}`
//! - Internal error details are logged, never sent to the client

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::records::exclude::ExcludeError;
use crate::records::store::StoreError;

/// Errors surfaced to API clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("The requested resource wasn't found.")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("The request requires valid admin authorization token to be set.")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("Too many requests.")]
    TooManyRequests,

    #[error("Something went wrong while processing your request.")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    data: serde_json::Map<String, serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
            data: serde_json::Map::new(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CollectionNotFound(_) | StoreError::RecordNotFound { .. } => {
                ApiError::NotFound
            }
            StoreError::DuplicateId { .. } => {
                ApiError::BadRequest("Failed to create record.".to_string())
            }
        }
    }
}

impl From<ExcludeError> for ApiError {
    fn from(err: ExcludeError) -> Self {
        tracing::error!(error = %err, "Failed to exclude record fields");
        ApiError::Internal
    }
}
