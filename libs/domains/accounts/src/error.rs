use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Admin not found: {0}")]
    AdminNotFound(Uuid),

    #[error("Account with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AccountResult<T> = Result<T, AccountError>;

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::UserNotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            AccountError::AdminNotFound(id) => {
                AppError::NotFound(format!("Admin {} not found", id))
            }
            AccountError::DuplicateEmail(email) => {
                AppError::Conflict(format!("Account with email '{}' already exists", email))
            }
            AccountError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            AccountError::Forbidden(msg) => AppError::Forbidden(msg),
            AccountError::Validation(msg) => AppError::BadRequest(msg),
            AccountError::Database(msg) => AppError::Database(msg),
            AccountError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for AccountError {
    fn from(err: mongodb::error::Error) -> Self {
        AccountError::Database(err.to_string())
    }
}
