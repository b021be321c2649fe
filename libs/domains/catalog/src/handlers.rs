use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_helpers::{
    AuthUser, JwtAuth, Role, RoleGuard, UuidPath, UuidPathPair, ValidatedJson, require_roles,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CatalogResult;
use crate::models::{
    CreateProduct, CreateProductCategory, CreateReview, Product, ProductCategory, ProductFilter,
    Review, TopProducts, TopProductsResponse, UpdateProduct, UpdateProductCategory,
    UpdateTopProducts,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

/// OpenAPI documentation for the catalog API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        get_category,
        create_category,
        update_category,
        delete_category,
        list_products,
        get_product,
        create_product,
        update_product,
        delete_product,
        list_reviews,
        add_review,
        delete_review,
        get_top_products,
        set_top_products,
    ),
    components(
        schemas(
            ProductCategory, CreateProductCategory, UpdateProductCategory,
            Product, CreateProduct, UpdateProduct, ProductFilter,
            Review, CreateReview,
            TopProducts, TopProductsResponse, UpdateTopProducts
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
        (name = "Product Categories", description = "Product category management"),
        (name = "Products", description = "Product catalog"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Top Products", description = "Curated featured-product slots")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<CatalogService<R>>;

/// Create the catalog router. Paths are relative to `/api`.
pub fn router<R: CatalogRepository + 'static>(service: CatalogService<R>, auth: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    let public = Router::new()
        .route("/product-categories", get(list_categories))
        .route("/product-categories/{id}", get(get_category))
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}/reviews", get(list_reviews))
        .route("/top-products", get(get_top_products));

    let admin = Router::new()
        .route("/product-categories", post(create_category))
        .route(
            "/product-categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/products", post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/top-products", put(set_top_products))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth.clone(), &[Role::Admin]),
            require_roles,
        ));

    let user = Router::new()
        .route("/products/{id}/reviews", post(add_review))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth.clone(), &[Role::User]),
            require_roles,
        ));

    // Authorship is checked in the service
    let author_or_admin = Router::new()
        .route("/products/{id}/reviews/{review_id}", delete(delete_review))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth, &[Role::Admin, Role::User]),
            require_roles,
        ));

    public
        .merge(admin)
        .merge(user)
        .merge(author_or_admin)
        .with_state(shared_service)
}

/// List product categories
#[utoipa::path(
    get,
    path = "/product-categories",
    tag = "Product Categories",
    responses(
        (status = 200, description = "List of categories", body = Vec<ProductCategory>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
) -> CatalogResult<Json<Vec<ProductCategory>>> {
    Ok(Json(service.list_categories().await?))
}

/// Get a product category by ID
#[utoipa::path(
    get,
    path = "/product-categories/{id}",
    tag = "Product Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = ProductCategory),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<ProductCategory>> {
    Ok(Json(service.get_category(id).await?))
}

/// Create a product category
#[utoipa::path(
    post,
    path = "/product-categories",
    tag = "Product Categories",
    request_body = CreateProductCategory,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Category created", body = ProductCategory),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateProductCategory>,
) -> CatalogResult<impl IntoResponse> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a product category
#[utoipa::path(
    put,
    path = "/product-categories/{id}",
    tag = "Product Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateProductCategory,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Category updated", body = ProductCategory),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProductCategory>,
) -> CatalogResult<Json<ProductCategory>> {
    Ok(Json(service.update_category(id, input).await?))
}

/// Delete an unused product category
#[utoipa::path(
    delete,
    path = "/product-categories/{id}",
    tag = "Product Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<impl IntoResponse> {
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List products, newest first
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    params(ProductFilter),
    responses(
        (status = 200, description = "List of products", body = Vec<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    Query(filter): Query<ProductFilter>,
) -> CatalogResult<Json<Vec<Product>>> {
    Ok(Json(service.list_products(filter).await?))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Product>> {
    Ok(Json(service.get_product(id).await?))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    request_body = CreateProduct,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> CatalogResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProduct,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> CatalogResult<Json<Product>> {
    Ok(Json(service.update_product(id, input).await?))
}

/// Delete a product; it is also removed from the top-products slots
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<impl IntoResponse> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reviews of a product
#[utoipa::path(
    get,
    path = "/products/{id}/reviews",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Reviews", body = Vec<Review>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_reviews<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Vec<Review>>> {
    Ok(Json(service.list_reviews(id).await?))
}

/// Review a product (one review per user)
#[utoipa::path(
    post,
    path = "/products/{id}/reviews",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateReview,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Review added; returns the updated product", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_review<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<CreateReview>,
) -> CatalogResult<impl IntoResponse> {
    let product = service.add_review(&actor, id, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Delete a review (admin or its author)
#[utoipa::path(
    delete,
    path = "/products/{id}/reviews/{review_id}",
    tag = "Reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("review_id" = Uuid, Path, description = "Review ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Review removed; returns the updated product", body = Product),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_review<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPathPair(id, review_id): UuidPathPair,
) -> CatalogResult<Json<Product>> {
    Ok(Json(service.delete_review(&actor, id, review_id).await?))
}

/// Featured products in slot order; empty or deleted slots are null
#[utoipa::path(
    get,
    path = "/top-products",
    tag = "Top Products",
    responses(
        (status = 200, description = "Top products", body = TopProductsResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_top_products<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
) -> CatalogResult<Json<TopProductsResponse>> {
    Ok(Json(service.get_top_products().await?))
}

/// Replace the featured-product slots
#[utoipa::path(
    put,
    path = "/top-products",
    tag = "Top Products",
    request_body = UpdateTopProducts,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Top products saved", body = TopProductsResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn set_top_products<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<UpdateTopProducts>,
) -> CatalogResult<Json<TopProductsResponse>> {
    Ok(Json(service.set_top_products(input).await?))
}
