use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Category with name '{0}' already exists")]
    DuplicateCategoryName(String),

    #[error("Category {0} is still referenced by products")]
    CategoryInUse(Uuid),

    #[error("You have already reviewed this product")]
    DuplicateReview,

    #[error("Invalid top products: {0}")]
    InvalidTopProducts(String),

    #[error("Top products were modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict { expected: i64, actual: i64 },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn product_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Product",
            id,
        }
    }

    pub fn category_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Product category",
            id,
        }
    }

    pub fn review_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Review",
            id,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { entity, id } => {
                AppError::NotFound(format!("{} {} not found", entity, id))
            }
            err @ (CatalogError::DuplicateCategoryName(_)
            | CatalogError::CategoryInUse(_)
            | CatalogError::DuplicateReview
            | CatalogError::VersionConflict { .. }) => AppError::Conflict(err.to_string()),
            err @ CatalogError::InvalidTopProducts(_) => AppError::BadRequest(err.to_string()),
            CatalogError::Forbidden(msg) => AppError::Forbidden(msg),
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::Database(msg) => AppError::Database(msg),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}
