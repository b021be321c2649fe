//! UUID path parameter extractors with automatic validation.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Extractor for a single UUID path parameter.
///
/// ```ignore
/// async fn get_clinic(UuidPath(id): UuidPath) -> String {
///     format!("Clinic ID: {}", id)
/// }
///
/// let app = Router::new().route("/clinics/{id}", get(get_clinic));
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        parse_uuid(&id).map(UuidPath)
    }
}

/// Extractor for two UUID path parameters, e.g. `/products/{id}/reviews/{review_id}`.
pub struct UuidPathPair(pub Uuid, pub Uuid);

impl<S> FromRequestParts<S> for UuidPathPair
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((first, second)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        Ok(UuidPathPair(parse_uuid(&first)?, parse_uuid(&second)?))
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::BadRequest(format!("Invalid UUID: {}", raw)).into_response())
}
