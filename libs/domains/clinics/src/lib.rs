//! Clinics Domain
//!
//! Clinic categories, clinics (which log in with their own credentials),
//! doctors, billable services, the per-clinic purchased-service ledger and
//! user appointments.
//!
//! Writes on doctors, services and a clinic's own profile are allowed to
//! admins and to the owning clinic; the ownership check lives in
//! [`ClinicService`], the role gate in the router.
//!
//! ```rust,ignore
//! use domain_clinics::{ClinicService, MongoClinicRepository, handlers};
//!
//! let repository = MongoClinicRepository::new(&db);
//! repository.ensure_indexes().await?;
//! let service = ClinicService::new(repository, jwt_auth.clone());
//! let router = handlers::router(service.clone(), jwt_auth);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ClinicError, ClinicResult};
pub use handlers::ApiDoc;
pub use models::{
    Appointment, AppointmentStatus, Clinic, ClinicAuthResponse, ClinicCategory, ClinicFilter,
    ClinicLoginRequest, ClinicResponse, CreateAppointment, CreateClinic, CreateClinicCategory,
    CreateDoctor, CreateService, Doctor, PurchasedService, Service, ServiceFilter,
    ServiceResponse, UpdateAppointmentStatus, UpdateClinic, UpdateClinicCategory, UpdateDoctor,
    UpdateService,
};
pub use mongodb::MongoClinicRepository;
pub use repository::ClinicRepository;
pub use service::ClinicService;
