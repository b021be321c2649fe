//! JSON extractor with automatic validation using the validator crate.

use crate::errors::{AppError, ErrorCode, ErrorResponse, validation_details};
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Malformed bodies are rejected through [`AppError::JsonExtractorRejection`];
/// bodies that fail `Validate` get a 400 with per-field details.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct Signup {
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn signup(ValidatedJson(payload): ValidatedJson<Signup>) -> String {
///     payload.email
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::JsonExtractorRejection(e).into_response())?;

        data.validate().map_err(|e| {
            let body = ErrorResponse::new(
                ErrorCode::ValidationError,
                ErrorCode::ValidationError.default_message(),
            )
            .with_details(validation_details(&e));

            (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
        })?;

        Ok(ValidatedJson(data))
    }
}
