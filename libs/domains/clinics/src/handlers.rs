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
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ClinicResult;
use crate::models::{
    Appointment, AppointmentStatus, ClinicAuthResponse, ClinicCategory, ClinicFilter,
    ClinicLoginRequest, ClinicResponse, CreateAppointment, CreateClinic, CreateClinicCategory,
    CreateDoctor, CreateService, Doctor, PurchasedService, Service, ServiceFilter,
    ServiceResponse, UpdateAppointmentStatus, UpdateClinic, UpdateClinicCategory, UpdateDoctor,
    UpdateService,
};
use crate::repository::ClinicRepository;
use crate::service::ClinicService;

/// OpenAPI documentation for the clinics API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        get_category,
        create_category,
        update_category,
        delete_category,
        list_clinics,
        get_clinic,
        create_clinic,
        update_clinic,
        delete_clinic,
        login_clinic,
        purchased_services,
        list_doctors,
        get_doctor,
        create_doctor,
        update_doctor,
        delete_doctor,
        list_services,
        get_service,
        create_service,
        update_service,
        delete_service,
        book_appointment,
        my_appointments,
        clinic_appointments,
        update_appointment_status,
        cancel_appointment,
    ),
    components(
        schemas(
            ClinicCategory, CreateClinicCategory, UpdateClinicCategory,
            ClinicResponse, CreateClinic, UpdateClinic, ClinicFilter,
            ClinicLoginRequest, ClinicAuthResponse, PurchasedService,
            Doctor, CreateDoctor, UpdateDoctor,
            Service, ServiceResponse, CreateService, UpdateService, ServiceFilter,
            Appointment, AppointmentStatus, CreateAppointment, UpdateAppointmentStatus
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
        (name = "Clinic Categories", description = "Categories shared by clinics and services"),
        (name = "Clinics", description = "Clinic profiles, login and purchase ledger"),
        (name = "Doctors", description = "Clinic staff"),
        (name = "Services", description = "Billable clinic services"),
        (name = "Appointments", description = "Bookings made by users")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<ClinicService<R>>;

/// Create the clinics router. Paths are relative to `/api`.
pub fn router<R: ClinicRepository + 'static>(service: ClinicService<R>, auth: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    let public = Router::new()
        .route("/clinic-categories", get(list_categories))
        .route("/clinic-categories/{id}", get(get_category))
        .route("/clinics", get(list_clinics))
        .route("/clinics/{id}", get(get_clinic))
        .route("/clinics/{id}/doctors", get(list_doctors))
        .route("/doctors/{id}", get(get_doctor))
        .route("/services", get(list_services))
        .route("/services/{id}", get(get_service))
        .route("/auth/clinic/login", post(login_clinic));

    let admin = Router::new()
        .route("/clinic-categories", post(create_category))
        .route(
            "/clinic-categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/clinics", post(create_clinic))
        .route("/clinics/{id}", delete(delete_clinic))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth.clone(), &[Role::Admin]),
            require_roles,
        ));

    // Ownership is checked in the service against the token subject
    let clinic_or_admin = Router::new()
        .route("/clinics/{id}", put(update_clinic))
        .route("/clinics/{id}/purchased-services", get(purchased_services))
        .route("/clinics/{id}/appointments", get(clinic_appointments))
        .route("/doctors", post(create_doctor))
        .route("/doctors/{id}", put(update_doctor).delete(delete_doctor))
        .route("/services", post(create_service))
        .route("/services/{id}", put(update_service).delete(delete_service))
        .route("/appointments/{id}/status", put(update_appointment_status))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth.clone(), &[Role::Admin, Role::Clinic]),
            require_roles,
        ));

    let user = Router::new()
        .route("/appointments", post(book_appointment))
        .route("/appointments/me", get(my_appointments))
        .route("/appointments/{id}/cancel", post(cancel_appointment))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(auth, &[Role::User]),
            require_roles,
        ));

    public
        .merge(admin)
        .merge(clinic_or_admin)
        .merge(user)
        .with_state(shared_service)
}

// Categories

/// List clinic categories
#[utoipa::path(
    get,
    path = "/clinic-categories",
    tag = "Clinic Categories",
    responses(
        (status = 200, description = "List of categories", body = Vec<ClinicCategory>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
) -> ClinicResult<Json<Vec<ClinicCategory>>> {
    Ok(Json(service.list_categories().await?))
}

/// Get a clinic category by ID
#[utoipa::path(
    get,
    path = "/clinic-categories/{id}",
    tag = "Clinic Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = ClinicCategory),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ClinicResult<Json<ClinicCategory>> {
    Ok(Json(service.get_category(id).await?))
}

/// Create a clinic category
#[utoipa::path(
    post,
    path = "/clinic-categories",
    tag = "Clinic Categories",
    request_body = CreateClinicCategory,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Category created", body = ClinicCategory),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateClinicCategory>,
) -> ClinicResult<impl IntoResponse> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a clinic category
#[utoipa::path(
    put,
    path = "/clinic-categories/{id}",
    tag = "Clinic Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateClinicCategory,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Category updated", body = ClinicCategory),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateClinicCategory>,
) -> ClinicResult<Json<ClinicCategory>> {
    Ok(Json(service.update_category(id, input).await?))
}

/// Delete a clinic category that nothing references
#[utoipa::path(
    delete,
    path = "/clinic-categories/{id}",
    tag = "Clinic Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ClinicResult<impl IntoResponse> {
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Clinics

/// List clinics with optional filters
#[utoipa::path(
    get,
    path = "/clinics",
    tag = "Clinics",
    params(ClinicFilter),
    responses(
        (status = 200, description = "List of clinics", body = Vec<ClinicResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_clinics<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    Query(filter): Query<ClinicFilter>,
) -> ClinicResult<Json<Vec<ClinicResponse>>> {
    Ok(Json(service.list_clinics(filter).await?))
}

/// Get a clinic with its category
#[utoipa::path(
    get,
    path = "/clinics/{id}",
    tag = "Clinics",
    params(("id" = Uuid, Path, description = "Clinic ID")),
    responses(
        (status = 200, description = "Clinic found", body = ClinicResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_clinic<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ClinicResult<Json<ClinicResponse>> {
    Ok(Json(service.get_clinic(id).await?))
}

/// Create a clinic account
#[utoipa::path(
    post,
    path = "/clinics",
    tag = "Clinics",
    request_body = CreateClinic,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Clinic created", body = ClinicResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_clinic<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateClinic>,
) -> ClinicResult<impl IntoResponse> {
    let clinic = service.create_clinic(input).await?;
    Ok((StatusCode::CREATED, Json(clinic)))
}

/// Update a clinic (admin or the clinic itself)
#[utoipa::path(
    put,
    path = "/clinics/{id}",
    tag = "Clinics",
    params(("id" = Uuid, Path, description = "Clinic ID")),
    request_body = UpdateClinic,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Clinic updated", body = ClinicResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_clinic<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateClinic>,
) -> ClinicResult<Json<ClinicResponse>> {
    Ok(Json(service.update_clinic(&actor, id, input).await?))
}

/// Delete a clinic along with its doctors and services
#[utoipa::path(
    delete,
    path = "/clinics/{id}",
    tag = "Clinics",
    params(("id" = Uuid, Path, description = "Clinic ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Clinic deleted"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_clinic<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ClinicResult<impl IntoResponse> {
    service.delete_clinic(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Log in as a clinic
#[utoipa::path(
    post,
    path = "/auth/clinic/login",
    tag = "Clinics",
    request_body = ClinicLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ClinicAuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login_clinic<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<ClinicLoginRequest>,
) -> ClinicResult<Json<ClinicAuthResponse>> {
    Ok(Json(service.login_clinic(input).await?))
}

/// Purchased-service ledger of a clinic
#[utoipa::path(
    get,
    path = "/clinics/{id}/purchased-services",
    tag = "Clinics",
    params(("id" = Uuid, Path, description = "Clinic ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<PurchasedService>),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn purchased_services<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPath(id): UuidPath,
) -> ClinicResult<Json<Vec<PurchasedService>>> {
    Ok(Json(service.purchased_services(&actor, id).await?))
}

// Doctors

/// List the doctors of a clinic
#[utoipa::path(
    get,
    path = "/clinics/{id}/doctors",
    tag = "Doctors",
    params(("id" = Uuid, Path, description = "Clinic ID")),
    responses(
        (status = 200, description = "List of doctors", body = Vec<Doctor>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_doctors<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(clinic_id): UuidPath,
) -> ClinicResult<Json<Vec<Doctor>>> {
    Ok(Json(service.list_doctors(clinic_id).await?))
}

/// Get a doctor by ID
#[utoipa::path(
    get,
    path = "/doctors/{id}",
    tag = "Doctors",
    params(("id" = Uuid, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor found", body = Doctor),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_doctor<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ClinicResult<Json<Doctor>> {
    Ok(Json(service.get_doctor(id).await?))
}

/// Add a doctor to a clinic
#[utoipa::path(
    post,
    path = "/doctors",
    tag = "Doctors",
    request_body = CreateDoctor,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Doctor created", body = Doctor),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_doctor<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    ValidatedJson(input): ValidatedJson<CreateDoctor>,
) -> ClinicResult<impl IntoResponse> {
    let doctor = service.create_doctor(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

/// Update a doctor
#[utoipa::path(
    put,
    path = "/doctors/{id}",
    tag = "Doctors",
    params(("id" = Uuid, Path, description = "Doctor ID")),
    request_body = UpdateDoctor,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Doctor updated", body = Doctor),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_doctor<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateDoctor>,
) -> ClinicResult<Json<Doctor>> {
    Ok(Json(service.update_doctor(&actor, id, input).await?))
}

/// Remove a doctor
#[utoipa::path(
    delete,
    path = "/doctors/{id}",
    tag = "Doctors",
    params(("id" = Uuid, Path, description = "Doctor ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Doctor deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_doctor<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPath(id): UuidPath,
) -> ClinicResult<impl IntoResponse> {
    service.delete_doctor(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Services

/// List services with optional filters
#[utoipa::path(
    get,
    path = "/services",
    tag = "Services",
    params(ServiceFilter),
    responses(
        (status = 200, description = "List of services", body = Vec<ServiceResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_services<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    Query(filter): Query<ServiceFilter>,
) -> ClinicResult<Json<Vec<ServiceResponse>>> {
    Ok(Json(service.list_services(filter).await?))
}

/// Get a service with its categories
#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service found", body = ServiceResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_service<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> ClinicResult<Json<ServiceResponse>> {
    Ok(Json(service.get_service(id).await?))
}

/// Create a service for a clinic
#[utoipa::path(
    post,
    path = "/services",
    tag = "Services",
    request_body = CreateService,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Service created", body = ServiceResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_service<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    ValidatedJson(input): ValidatedJson<CreateService>,
) -> ClinicResult<impl IntoResponse> {
    let created = service.create_service(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a service
#[utoipa::path(
    put,
    path = "/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = UpdateService,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Service updated", body = ServiceResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_service<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateService>,
) -> ClinicResult<Json<ServiceResponse>> {
    Ok(Json(service.update_service(&actor, id, input).await?))
}

/// Delete a service
#[utoipa::path(
    delete,
    path = "/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Service ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_service<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPath(id): UuidPath,
) -> ClinicResult<impl IntoResponse> {
    service.delete_service(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Appointments

/// Book an appointment
#[utoipa::path(
    post,
    path = "/appointments",
    tag = "Appointments",
    request_body = CreateAppointment,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn book_appointment<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    ValidatedJson(input): ValidatedJson<CreateAppointment>,
) -> ClinicResult<impl IntoResponse> {
    let appointment = service.book_appointment(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Appointments of the current user
#[utoipa::path(
    get,
    path = "/appointments/me",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User appointments", body = Vec<Appointment>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn my_appointments<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
) -> ClinicResult<Json<Vec<Appointment>>> {
    Ok(Json(service.my_appointments(&actor).await?))
}

/// Appointments booked at a clinic
#[utoipa::path(
    get,
    path = "/clinics/{id}/appointments",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "Clinic ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Clinic appointments", body = Vec<Appointment>),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn clinic_appointments<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPath(clinic_id): UuidPath,
) -> ClinicResult<Json<Vec<Appointment>>> {
    Ok(Json(service.clinic_appointments(&actor, clinic_id).await?))
}

/// Move an appointment to a new status
#[utoipa::path(
    put,
    path = "/appointments/{id}/status",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentStatus,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status updated", body = Appointment),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_appointment_status<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateAppointmentStatus>,
) -> ClinicResult<Json<Appointment>> {
    Ok(Json(
        service
            .update_appointment_status(&actor, id, input.status)
            .await?,
    ))
}

/// Cancel one of the current user's appointments
#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Appointment cancelled", body = Appointment),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn cancel_appointment<R: ClinicRepository>(
    State(service): State<SharedService<R>>,
    AuthUser(actor): AuthUser,
    UuidPath(id): UuidPath,
) -> ClinicResult<Json<Appointment>> {
    Ok(Json(service.cancel_appointment(&actor, id).await?))
}
