//! Error types for rqc-web
//!
//! JSON endpoints return `{"error": {"code", "message"}}`; HTML pages reuse
//! the status and message when re-rendering a form.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400), e.g. no file selected
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Login required (401)
    #[error("Login required")]
    Unauthorized,

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict (409), e.g. username taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upload exceeds the configured limit (413)
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// Not a CSV/XLSX file (415)
    #[error("Unsupported file: {0}")]
    UnsupportedMediaType(String),

    /// Spreadsheet could not be read (422)
    #[error("Unprocessable file: {0}")]
    Unprocessable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::Unprocessable(_) => "UNPROCESSABLE_FILE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message suitable for showing to the user
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::UnsupportedMediaType(msg)
            | ApiError::Unprocessable(msg) => msg.clone(),
            ApiError::Unauthorized => "Please log in to continue".to_string(),
            // Details stay in the log
            ApiError::Internal(_) => "Something went wrong on our side".to_string(),
        }
    }
}

impl From<rqc_common::Error> for ApiError {
    fn from(err: rqc_common::Error) -> Self {
        use rqc_common::Error;

        match err {
            Error::UnsupportedFile(msg) => ApiError::UnsupportedMediaType(msg),
            Error::Parse(msg) => ApiError::Unprocessable(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => {
                tracing::error!("Request failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("File exceeds the upload size limit".to_string())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.message(),
            }
        }));

        (self.status(), body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_errors_map_to_status() {
        let cases = [
            (
                rqc_common::Error::UnsupportedFile("x".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                rqc_common::Error::Parse("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (rqc_common::Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (rqc_common::Error::Conflict("x".into()), StatusCode::CONFLICT),
            (
                rqc_common::Error::InvalidInput("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                rqc_common::Error::Model("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_message_hides_details() {
        let err = ApiError::Internal("database is locked".to_string());
        assert!(!err.message().contains("locked"));
    }
}
