//! API error handling.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::services::selfie::SelfieError;

/// API error type.
///
/// Every variant renders as `{ "success": false, "kind": ..., "message": ... }`.
/// `Internal` carries the underlying detail for the server log only.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),
    Internal(String),
}

impl ApiError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::UnsupportedMediaType(_) => "unsupported_media_type",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "kind": kind,
            "message": message
        }));

        (status, body).into_response()
    }
}

impl From<hireline_core::Error> for ApiError {
    fn from(err: hireline_core::Error) -> Self {
        match err {
            hireline_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl From<hireline_db::DbError> for ApiError {
    fn from(err: hireline_db::DbError) -> Self {
        match err {
            hireline_db::DbError::NotFound(msg) => ApiError::NotFound(msg),
            hireline_db::DbError::Conflict(msg) => ApiError::Conflict(msg),
            hireline_db::DbError::Duplicate(msg) => {
                ApiError::Conflict(format!("{} already exists", msg))
            }
            hireline_db::DbError::Constraint(msg) => {
                ApiError::BadRequest(format!("rejected by constraint: {}", msg))
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                ApiError::UnsupportedMediaType(rejection.body_text())
            }
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(rejection.body_text()),
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        if rejection.status().is_server_error() {
            ApiError::Internal(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<SelfieError> for ApiError {
    fn from(err: SelfieError) -> Self {
        match err {
            SelfieError::Empty => ApiError::BadRequest(err.to_string()),
            SelfieError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            SelfieError::UnsupportedType(_) => ApiError::UnsupportedMediaType(err.to_string()),
            SelfieError::Io(_) => ApiError::Internal(err.to_string()),
        }
    }
}
