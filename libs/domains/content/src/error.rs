use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Unsupported short URL: {0}")]
    UnsupportedShortUrl(String),

    #[error("Quiz {0} is not accepting submissions")]
    QuizInactive(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContentError {
    pub fn quiz_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "Quiz", id }
    }

    pub fn offer_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Offer",
            id,
        }
    }

    pub fn short_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Short",
            id,
        }
    }
}

pub type ContentResult<T> = Result<T, ContentError>;

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound { entity, id } => {
                AppError::NotFound(format!("{} {} not found", entity, id))
            }
            err @ (ContentError::UnsupportedShortUrl(_) | ContentError::QuizInactive(_)) => {
                AppError::BadRequest(err.to_string())
            }
            ContentError::Validation(msg) => AppError::BadRequest(msg),
            ContentError::Database(msg) => AppError::Database(msg),
            ContentError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ContentError {
    fn from(err: mongodb::error::Error) -> Self {
        ContentError::Database(err.to_string())
    }
}
