//! HTTP error mapping.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use visa_core::ErrorKind;

use crate::envelope::Envelope;

/// Message returned for any server-side failure. Details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Message returned when a request body exceeds the size limit.
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Request body is too large";

/// Message returned when the global rate limit is exhausted.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please retry later";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("rate limit exceeded")]
    TooManyRequests,

    #[error(transparent)]
    Internal(visa_core::Error),
}

impl From<visa_core::Error> for ApiError {
    fn from(err: visa_core::Error) -> Self {
        match err.kind() {
            ErrorKind::Validation => ApiError::BadRequest(err.to_string()),
            ErrorKind::NotFound => ApiError::NotFound(err.to_string()),
            ErrorKind::Internal => ApiError::Internal(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // Chunked bodies over the limit fail while buffering.
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge;
        }
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) => {
                warn!(status = status.as_u16(), error = %msg, "Rejected request");
                msg
            }
            ApiError::NotFound(msg) => msg,
            ApiError::PayloadTooLarge => {
                warn!(status = status.as_u16(), "Request body over limit");
                PAYLOAD_TOO_LARGE_MESSAGE.to_string()
            }
            ApiError::TooManyRequests => RATE_LIMITED_MESSAGE.to_string(),
            ApiError::Internal(err) => {
                error!(status = status.as_u16(), error = %err, "Request failed");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        };

        (status, Json(Envelope::failure(message))).into_response()
    }
}
