use super::jwt::{JwtAuth, JwtClaims, Role};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Extract JWT from Authorization header or cookie
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    // Try Authorization header first: "Bearer <token>"
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.trim().to_string()))
        .or_else(|| {
            // Fallback to cookie: "access_token=<token>"
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == "access_token").then(|| value.to_string())
                    })
                })
        })
        .filter(|token| !token.is_empty())
}

fn authenticate(auth: &JwtAuth, headers: &HeaderMap) -> Result<JwtClaims, AppError> {
    let Some(token) = extract_token_from_request(headers) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return Err(AppError::Unauthorized("No token provided".to_string()));
    };

    auth.verify_token(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })
}

/// JWT authentication middleware
///
/// Validates the token signature and expiry, then inserts [`JwtClaims`]
/// into request extensions for [`crate::extractors::AuthUser`].
///
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/auth/me", get(me))
///     .route_layer(axum::middleware::from_fn_with_state(auth.clone(), jwt_auth_middleware));
/// ```
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate(&auth, &headers)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Optional JWT authentication middleware
///
/// Like [`jwt_auth_middleware`] but lets anonymous and invalid-token requests through.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(claims) = authenticate(&auth, &headers) {
        request.extensions_mut().insert(claims);
    }

    next.run(request).await
}

/// State for [`require_roles`]: who may pass and how to verify them
#[derive(Clone)]
pub struct RoleGuard {
    auth: JwtAuth,
    roles: &'static [Role],
}

impl RoleGuard {
    pub fn new(auth: JwtAuth, roles: &'static [Role]) -> Self {
        Self { auth, roles }
    }
}

/// Authenticate and require one of the guard's roles.
///
/// Missing or invalid tokens yield 401, a valid token with the wrong role 403.
///
/// ```ignore
/// let admin_routes = Router::new()
///     .route("/users", get(list_users))
///     .route_layer(axum::middleware::from_fn_with_state(
///         RoleGuard::new(auth.clone(), &[Role::Admin]),
///         require_roles,
///     ));
/// ```
pub async fn require_roles(
    State(guard): State<RoleGuard>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate(&guard.auth, &headers)?;

    if !claims.has_any_role(guard.roles) {
        tracing::debug!(role = %claims.role, sub = %claims.sub, "Role not permitted");
        return Err(AppError::Forbidden(format!(
            "Role '{}' is not allowed to access this resource",
            claims.role
        )));
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("middleware-test-secret-long-enough-123"))
    }

    fn app(auth: JwtAuth, roles: &'static [Role]) -> Router {
        Router::new().route("/", get(|| async { "ok" })).route_layer(
            middleware::from_fn_with_state(RoleGuard::new(auth, roles), require_roles),
        )
    }

    fn request_with(token: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(
            extract_token_from_request(&headers).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "theme=dark; access_token=tok123".parse().unwrap());
        assert_eq!(extract_token_from_request(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn test_extract_token_ignores_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(extract_token_from_request(&headers).is_none());
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let response = app(auth(), &[Role::Admin])
            .oneshot(request_with(None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let response = app(auth(), &[Role::Admin])
            .oneshot(request_with(Some("not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let auth = auth();
        let token = auth
            .create_token(Uuid::now_v7(), "u@example.com", "U", Role::User)
            .unwrap();
        let response = app(auth, &[Role::Admin])
            .oneshot(request_with(Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_superadmin_passes_admin_guard() {
        let auth = auth();
        let token = auth
            .create_token(Uuid::now_v7(), "root@example.com", "Root", Role::SuperAdmin)
            .unwrap();
        let response = app(auth, &[Role::Admin])
            .oneshot(request_with(Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_jwt_auth_middleware_accepts_any_role() {
        let auth = auth();
        let token = auth
            .create_token(Uuid::now_v7(), "c@example.com", "C", Role::Clinic)
            .unwrap();
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(
                auth.clone(),
                jwt_auth_middleware,
            ));
        let response = app.oneshot(request_with(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
