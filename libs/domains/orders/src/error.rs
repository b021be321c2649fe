use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::OrderStatus;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(id) => AppError::NotFound(format!("Order {} not found", id)),
            OrderError::Forbidden(msg) => AppError::Forbidden(msg),
            err @ OrderError::InvalidTransition { .. } => AppError::BadRequest(err.to_string()),
            OrderError::Validation(msg) => AppError::BadRequest(msg),
            OrderError::Database(msg) => AppError::Database(msg),
            OrderError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for OrderError {
    fn from(err: mongodb::error::Error) -> Self {
        OrderError::Database(err.to_string())
    }
}
