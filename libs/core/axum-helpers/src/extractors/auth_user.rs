use crate::auth::JwtClaims;
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Claims of the authenticated caller.
///
/// Requires [`crate::auth::jwt_auth_middleware`] or [`crate::auth::require_roles`]
/// upstream; without it the request is rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<JwtClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Claims when a token was presented, `None` for anonymous callers
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<JwtClaims>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<JwtClaims>().cloned()))
    }
}
