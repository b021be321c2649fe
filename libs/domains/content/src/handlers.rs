use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    JwtAuth, Role, RoleGuard, UuidPath, ValidatedJson, require_roles,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ContentResult;
use crate::models::{
    CreateOffer, CreateQuiz, CreateShort, Offer, OfferFilter, PublicQuestion, Question, Quiz,
    QuizFilter, QuizResponse, QuizScore, QuizSubmission, Short, ShortPlatform, UpdateOffer,
    UpdateQuiz, UpdateShort,
};
use crate::repository::ContentRepository;
use crate::service::ContentService;

/// OpenAPI documentation for the content API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_quizzes,
        get_quiz,
        create_quiz,
        update_quiz,
        delete_quiz,
        submit_quiz,
        list_offers,
        get_offer,
        create_offer,
        update_offer,
        delete_offer,
        list_shorts,
        get_short,
        create_short,
        update_short,
        delete_short,
    ),
    components(
        schemas(
            Quiz, Question, QuizResponse, PublicQuestion, CreateQuiz, UpdateQuiz, QuizFilter,
            QuizSubmission, QuizScore,
            Offer, CreateOffer, UpdateOffer, OfferFilter,
            Short, ShortPlatform, CreateShort, UpdateShort
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
        (name = "Quizzes", description = "Self-assessment quizzes"),
        (name = "Offers", description = "Promotional offers"),
        (name = "Shorts", description = "Embedded short videos")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<ContentService<R>>;

/// Create the content router. Paths are relative to `/api`.
pub fn router<R: ContentRepository + 'static>(service: ContentService<R>, auth: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    let public = Router::new()
        .route("/quizzes", get(list_quizzes))
        .route("/quizzes/{id}", get(get_quiz))
        .route("/quizzes/{id}/submit", post(submit_quiz))
        .route("/offers", get(list_offers))
        .route("/offers/{id}", get(get_offer))
        .route("/shorts", get(list_shorts))
        .route("/shorts/{id}", get(get_short));

    let admin = Router::new()
        .route("/quizzes", post(create_quiz))
        .route("/quizzes/{id}", put(update_quiz).delete(delete_quiz))
        .route("/offers", post(create_offer))
        .route("/offers/{id}", put(update_offer).delete(delete_offer))
        .route("/shorts", post(create_short))
        .route("/shorts/{id}", put(update_short).delete(delete_short))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth, &[Role::Admin]),
            require_roles,
        ));

    public.merge(admin).with_state(shared_service)
}

/// List quizzes (active only unless `include_inactive`)
#[utoipa::path(
    get,
    path = "/quizzes",
    tag = "Quizzes",
    params(QuizFilter),
    responses(
        (status = 200, description = "Quizzes without their answers", body = Vec<QuizResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_quizzes<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    Query(filter): Query<QuizFilter>,
) -> ContentResult<Json<Vec<QuizResponse>>> {
    Ok(Json(service.list_quizzes(filter).await?))
}

/// Get a quiz
#[utoipa::path(
    get,
    path = "/quizzes/{id}",
    tag = "Quizzes",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz found", body = QuizResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_quiz<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ContentResult<Json<QuizResponse>> {
    Ok(Json(service.get_quiz(id).await?))
}

/// Create a quiz
#[utoipa::path(
    post,
    path = "/quizzes",
    tag = "Quizzes",
    request_body = CreateQuiz,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Quiz created", body = Quiz),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_quiz<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateQuiz>,
) -> ContentResult<impl IntoResponse> {
    let quiz = service.create_quiz(input).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Update a quiz
#[utoipa::path(
    put,
    path = "/quizzes/{id}",
    tag = "Quizzes",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = UpdateQuiz,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Quiz updated", body = Quiz),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_quiz<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateQuiz>,
) -> ContentResult<Json<Quiz>> {
    Ok(Json(service.update_quiz(id, input).await?))
}

/// Delete a quiz
#[utoipa::path(
    delete,
    path = "/quizzes/{id}",
    tag = "Quizzes",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Quiz deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_quiz<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ContentResult<impl IntoResponse> {
    service.delete_quiz(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit answers and get a score
#[utoipa::path(
    post,
    path = "/quizzes/{id}/submit",
    tag = "Quizzes",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = QuizSubmission,
    responses(
        (status = 200, description = "Score over the questions that have an answer", body = QuizScore),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn submit_quiz<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    ValidatedJson(submission): ValidatedJson<QuizSubmission>,
) -> ContentResult<Json<QuizScore>> {
    Ok(Json(service.submit_quiz(id, submission).await?))
}

/// List offers
#[utoipa::path(
    get,
    path = "/offers",
    tag = "Offers",
    params(OfferFilter),
    responses(
        (status = 200, description = "Offers", body = Vec<Offer>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_offers<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    Query(filter): Query<OfferFilter>,
) -> ContentResult<Json<Vec<Offer>>> {
    Ok(Json(service.list_offers(filter).await?))
}

/// Get an offer
#[utoipa::path(
    get,
    path = "/offers/{id}",
    tag = "Offers",
    params(("id" = Uuid, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer found", body = Offer),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_offer<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ContentResult<Json<Offer>> {
    Ok(Json(service.get_offer(id).await?))
}

/// Create an offer
#[utoipa::path(
    post,
    path = "/offers",
    tag = "Offers",
    request_body = CreateOffer,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Offer created", body = Offer),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_offer<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateOffer>,
) -> ContentResult<impl IntoResponse> {
    let offer = service.create_offer(input).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

/// Update an offer
#[utoipa::path(
    put,
    path = "/offers/{id}",
    tag = "Offers",
    params(("id" = Uuid, Path, description = "Offer ID")),
    request_body = UpdateOffer,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Offer updated", body = Offer),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_offer<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateOffer>,
) -> ContentResult<Json<Offer>> {
    Ok(Json(service.update_offer(id, input).await?))
}

/// Delete an offer
#[utoipa::path(
    delete,
    path = "/offers/{id}",
    tag = "Offers",
    params(("id" = Uuid, Path, description = "Offer ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Offer deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_offer<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ContentResult<impl IntoResponse> {
    service.delete_offer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List shorts, newest first
#[utoipa::path(
    get,
    path = "/shorts",
    tag = "Shorts",
    responses(
        (status = 200, description = "Shorts", body = Vec<Short>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_shorts<R: ContentRepository>(
    State(service): State<SharedService<R>>,
) -> ContentResult<Json<Vec<Short>>> {
    Ok(Json(service.list_shorts().await?))
}

/// Get a short
#[utoipa::path(
    get,
    path = "/shorts/{id}",
    tag = "Shorts",
    params(("id" = Uuid, Path, description = "Short ID")),
    responses(
        (status = 200, description = "Short found", body = Short),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_short<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ContentResult<Json<Short>> {
    Ok(Json(service.get_short(id).await?))
}

/// Add a short from a YouTube or Instagram link
#[utoipa::path(
    post,
    path = "/shorts",
    tag = "Shorts",
    request_body = CreateShort,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Short created with its embed URL", body = Short),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_short<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateShort>,
) -> ContentResult<impl IntoResponse> {
    let short = service.create_short(input).await?;
    Ok((StatusCode::CREATED, Json(short)))
}

/// Update a short
#[utoipa::path(
    put,
    path = "/shorts/{id}",
    tag = "Shorts",
    params(("id" = Uuid, Path, description = "Short ID")),
    request_body = UpdateShort,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Short updated", body = Short),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_short<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateShort>,
) -> ContentResult<Json<Short>> {
    Ok(Json(service.update_short(id, input).await?))
}

/// Delete a short
#[utoipa::path(
    delete,
    path = "/shorts/{id}",
    tag = "Shorts",
    params(("id" = Uuid, Path, description = "Short ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Short deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_short<R: ContentRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ContentResult<impl IntoResponse> {
    service.delete_short(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
