pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// Every error the API returns has this shape:
///
/// ```json
/// {
///   "code": 1008,
///   "error": "CONFLICT",
///   "message": "Clinic with email 'a@b.c' already exists",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, serde::Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details (e.g., validation field errors)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Domain crates define their own error enums and convert into this one,
/// so every handler answers with the same body and status mapping.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON parsing error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// HTTP status and error code this error renders as
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::SerdeJson(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::SerdeJsonError),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::IoError),
            AppError::JsonExtractorRejection(e) => (e.status(), ErrorCode::JsonExtraction),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, ErrorCode::ValidationError),
            AppError::UuidError(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidUuid),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadRequest),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
            AppError::UnprocessableEntity(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::UnprocessableEntity,
            ),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError),
            AppError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError)
            }
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::ServiceUnavailable)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, details) = match self {
            AppError::SerdeJson(e) => {
                tracing::error!(error_code = code.code(), "JSON parsing error: {:?}", e);
                (code.default_message().to_string(), None)
            }
            AppError::Io(e) => {
                tracing::error!(error_code = code.code(), "I/O error: {:?}", e);
                (code.default_message().to_string(), None)
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = code.code(), "JSON extraction error: {:?}", e);
                (e.body_text(), None)
            }
            AppError::ValidationError(e) => {
                tracing::info!(error_code = code.code(), "Validation error: {:?}", e);
                (
                    code.default_message().to_string(),
                    Some(validation_details(&e)),
                )
            }
            AppError::UuidError(e) => {
                tracing::warn!(error_code = code.code(), "UUID error: {:?}", e);
                (code.default_message().to_string(), None)
            }
            AppError::Database(msg) => {
                // Driver messages can leak hostnames and query shapes
                tracing::error!(error_code = code.code(), "Database error: {}", msg);
                (code.default_message().to_string(), None)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error_code = code.code(), "Internal server error: {}", msg);
                (msg, None)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (msg, None)
            }
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::UnprocessableEntity(msg) => {
                tracing::info!(error_code = code.code(), "{}: {}", code, msg);
                (msg, None)
            }
        };

        let mut body = ErrorResponse::new(code, message);
        body.details = details;

        (status, Json(body)).into_response()
    }
}

/// Flatten validator errors into `{ field: [{code, message, params}] }`
pub fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::json!(messages))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(details)
}

/// Helper function to create error responses outside of `AppError`.
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(error_code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_renders_404_with_code() {
        let response = AppError::NotFound("Clinic 42 not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_of(response).await;
        assert_eq!(body.code, 1004);
        assert_eq!(body.error, "NOT_FOUND");
        assert_eq!(body.message, "Clinic 42 not found");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_conflict_renders_409() {
        let response = AppError::Conflict("duplicate".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_of(response).await.error, "CONFLICT");
    }

    #[tokio::test]
    async fn test_database_error_hides_driver_message() {
        let response =
            AppError::Database("connection refused at 10.0.0.7:27017".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body.error, "DATABASE_ERROR");
        assert!(!body.message.contains("10.0.0.7"));
    }

    #[test]
    fn test_status_and_code_for_auth_errors() {
        assert_eq!(
            AppError::Unauthorized("x".into()).status_and_code(),
            (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized)
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_and_code(),
            (StatusCode::FORBIDDEN, ErrorCode::Forbidden)
        );
    }
}
