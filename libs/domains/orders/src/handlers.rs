use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_helpers::{
    AuthUser, JwtAuth, Role, RoleGuard, UuidPath, ValidatedJson, require_roles,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::OrderResult;
use crate::ledger::ClinicLedger;
use crate::models::{
    ClinicSync, CreateOrder, ItemKind, Order, OrderFilter, OrderItem, OrderStatus,
    ShippingAddress, UpdateOrderStatus,
};
use crate::repository::OrderRepository;
use crate::service::OrderService;

/// OpenAPI documentation for the orders API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_order,
        my_orders,
        list_orders,
        get_order,
        update_order_status,
        delete_order,
        sync_clinics,
    ),
    components(
        schemas(
            Order, OrderItem, ItemKind, OrderStatus, ClinicSync, ShippingAddress,
            CreateOrder, UpdateOrderStatus, OrderFilter
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Orders", description = "Checkout and order administration")
    )
)]
pub struct ApiDoc;

type SharedService<R, L> = Arc<OrderService<R, L>>;

/// Create the orders router. Paths are relative to `/api`.
pub fn router<R, L>(service: OrderService<R, L>, auth: JwtAuth) -> Router
where
    R: OrderRepository + 'static,
    L: ClinicLedger + 'static,
{
    let shared_service = Arc::new(service);

    let user = Router::new()
        .route("/orders", post(create_order))
        .route("/orders/me", get(my_orders))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth.clone(), &[Role::User]),
            require_roles,
        ));

    let admin = Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", delete(delete_order))
        .route("/orders/{id}/status", put(update_order_status))
        .route("/orders/{id}/sync-clinics", post(sync_clinics))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth.clone(), &[Role::Admin]),
            require_roles,
        ));

    // Ownership is checked in the service
    let owner_or_admin = Router::new()
        .route("/orders/{id}", get(get_order))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth, &[Role::Admin, Role::User]),
            require_roles,
        ));

    user.merge(admin)
        .merge(owner_or_admin)
        .with_state(shared_service)
}

/// Place an order
///
/// The total is computed from the items. Service items are then written
/// to their clinics' ledgers; if any clinic cannot be updated the order is
/// still created with `clinic_sync = partial`.
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    request_body = CreateOrder,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_order<R: OrderRepository, L: ClinicLedger>(
    State(service): State<SharedService<R, L>>,
    AuthUser(actor): AuthUser,
    ValidatedJson(input): ValidatedJson<CreateOrder>,
) -> OrderResult<impl IntoResponse> {
    let order = service.create_order(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Orders of the calling user, newest first
#[utoipa::path(
    get,
    path = "/orders/me",
    tag = "Orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's orders", body = Vec<Order>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn my_orders<R: OrderRepository, L: ClinicLedger>(
    State(service): State<SharedService<R, L>>,
    AuthUser(actor): AuthUser,
) -> OrderResult<Json<Vec<Order>>> {
    Ok(Json(service.my_orders(&actor).await?))
}

/// List all orders
#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    params(OrderFilter),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders", body = Vec<Order>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_orders<R: OrderRepository, L: ClinicLedger>(
    State(service): State<SharedService<R, L>>,
    Query(filter): Query<OrderFilter>,
) -> OrderResult<Json<Vec<Order>>> {
    Ok(Json(service.list_orders(filter).await?))
}

/// Get an order (admin or the buyer)
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_order<R: OrderRepository, L: ClinicLedger>(
    State(service): State<SharedService<R, L>>,
    AuthUser(actor): AuthUser,
    UuidPath(id): UuidPath,
) -> OrderResult<Json<Order>> {
    Ok(Json(service.get_order(&actor, id).await?))
}

/// Change an order's status
#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatus,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status updated", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_order_status<R: OrderRepository, L: ClinicLedger>(
    State(service): State<SharedService<R, L>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateOrderStatus>,
) -> OrderResult<Json<Order>> {
    Ok(Json(service.update_status(id, input.status).await?))
}

/// Delete an order
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_order<R: OrderRepository, L: ClinicLedger>(
    State(service): State<SharedService<R, L>>,
    UuidPath(id): UuidPath,
) -> OrderResult<impl IntoResponse> {
    service.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Re-apply the order's clinic ledger writes
#[utoipa::path(
    post,
    path = "/orders/{id}/sync-clinics",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sync attempted; see clinic_sync", body = Order),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn sync_clinics<R: OrderRepository, L: ClinicLedger>(
    State(service): State<SharedService<R, L>>,
    UuidPath(id): UuidPath,
) -> OrderResult<Json<Order>> {
    Ok(Json(service.sync_clinics(id).await?))
}
