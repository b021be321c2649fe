use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::AppointmentStatus;

#[derive(Debug, Error)]
pub enum ClinicError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Clinic with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Category with name '{0}' already exists")]
    DuplicateCategoryName(String),

    #[error("Category {0} is still referenced by clinics or services")]
    CategoryInUse(Uuid),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClinicError {
    pub fn clinic_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Clinic",
            id,
        }
    }

    pub fn category_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Clinic category",
            id,
        }
    }

    pub fn doctor_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Doctor",
            id,
        }
    }

    pub fn service_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Service",
            id,
        }
    }

    pub fn appointment_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Appointment",
            id,
        }
    }
}

pub type ClinicResult<T> = Result<T, ClinicError>;

impl From<ClinicError> for AppError {
    fn from(err: ClinicError) -> Self {
        match err {
            ClinicError::NotFound { entity, id } => {
                AppError::NotFound(format!("{} {} not found", entity, id))
            }
            ClinicError::DuplicateEmail(email) => {
                AppError::Conflict(format!("Clinic with email '{}' already exists", email))
            }
            ClinicError::DuplicateCategoryName(name) => {
                AppError::Conflict(format!("Category with name '{}' already exists", name))
            }
            err @ ClinicError::CategoryInUse(_) => AppError::Conflict(err.to_string()),
            ClinicError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            ClinicError::Forbidden(msg) => AppError::Forbidden(msg),
            err @ ClinicError::InvalidTransition { .. } => AppError::BadRequest(err.to_string()),
            ClinicError::Validation(msg) => AppError::BadRequest(msg),
            ClinicError::Database(msg) => AppError::Database(msg),
            ClinicError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ClinicError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ClinicError {
    fn from(err: mongodb::error::Error) -> Self {
        ClinicError::Database(err.to_string())
    }
}
