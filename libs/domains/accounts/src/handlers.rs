use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_helpers::{
    AuthUser, JwtAuth, JwtClaims, Role, RoleGuard, UuidPath, ValidatedJson, jwt_auth_middleware,
    require_roles,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::AccountResult;
use crate::models::{
    AdminAuthResponse, AdminResponse, AdminRole, CreateAdmin, LoginRequest, SignupRequest,
    UserAuthResponse, UserFilter, UserResponse,
};
use crate::repository::AccountRepository;
use crate::service::AccountService;

/// OpenAPI documentation for the accounts API
#[derive(OpenApi)]
#[openapi(
    paths(
        signup_user,
        login_user,
        signup_admin,
        login_admin,
        me,
        list_users,
        get_user,
        delete_user,
        list_admins,
        delete_admin,
    ),
    components(
        schemas(
            SignupRequest, LoginRequest, CreateAdmin, UserResponse, AdminResponse, AdminRole,
            UserAuthResponse, AdminAuthResponse, UserFilter, JwtClaims, Role
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Auth", description = "Signup and login for users and admins"),
        (name = "Users", description = "User administration"),
        (name = "Admins", description = "Admin administration (superadmin only)")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<AccountService<R>>;

/// Create the accounts router. Paths are relative to `/api`.
pub fn router<R: AccountRepository + 'static>(service: AccountService<R>, auth: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    let public = Router::new()
        .route("/auth/user/signup", post(signup_user))
        .route("/auth/user/login", post(login_user))
        .route("/auth/admin/login", post(login_admin));

    let authenticated = Router::new()
        .route("/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            auth.clone(),
            jwt_auth_middleware,
        ));

    let admin = Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth.clone(), &[Role::Admin]),
            require_roles,
        ));

    let superadmin = Router::new()
        .route("/auth/admin/signup", post(signup_admin))
        .route("/admins", get(list_admins))
        .route("/admins/{id}", delete(delete_admin))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth, &[Role::SuperAdmin]),
            require_roles,
        ));

    public
        .merge(authenticated)
        .merge(admin)
        .merge(superadmin)
        .with_state(shared_service)
}

/// Register a storefront user
#[utoipa::path(
    post,
    path = "/auth/user/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered", body = UserAuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn signup_user<R: AccountRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<SignupRequest>,
) -> AccountResult<impl IntoResponse> {
    let response = service.signup_user(input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in a storefront user
#[utoipa::path(
    post,
    path = "/auth/user/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserAuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login_user<R: AccountRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AccountResult<Json<UserAuthResponse>> {
    Ok(Json(service.login_user(input).await?))
}

/// Create an admin account
#[utoipa::path(
    post,
    path = "/auth/admin/signup",
    tag = "Auth",
    request_body = CreateAdmin,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Admin created", body = AdminResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn signup_admin<R: AccountRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateAdmin>,
) -> AccountResult<impl IntoResponse> {
    let admin = service.create_admin(input).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// Log in an admin or superadmin
#[utoipa::path(
    post,
    path = "/auth/admin/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AdminAuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login_admin<R: AccountRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AccountResult<Json<AdminAuthResponse>> {
    Ok(Json(service.login_admin(input).await?))
}

/// Decoded claims of the current token
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current principal", body = JwtClaims),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn me(AuthUser(claims): AuthUser) -> Json<JwtClaims> {
    Json(claims)
}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(UserFilter),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: AccountRepository>(
    State(service): State<SharedService<R>>,
    Query(filter): Query<UserFilter>,
) -> AccountResult<Json<Vec<UserResponse>>> {
    Ok(Json(service.list_users(filter).await?))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: AccountRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> AccountResult<Json<UserResponse>> {
    Ok(Json(service.get_user(id).await?))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: AccountRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> AccountResult<impl IntoResponse> {
    service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List admins
#[utoipa::path(
    get,
    path = "/admins",
    tag = "Admins",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of admins", body = Vec<AdminResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_admins<R: AccountRepository>(
    State(service): State<SharedService<R>>,
) -> AccountResult<Json<Vec<AdminResponse>>> {
    Ok(Json(service.list_admins().await?))
}

/// Delete an admin
#[utoipa::path(
    delete,
    path = "/admins/{id}",
    tag = "Admins",
    params(("id" = Uuid, Path, description = "Admin ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Admin deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_admin<R: AccountRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> AccountResult<impl IntoResponse> {
    service.delete_admin(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
