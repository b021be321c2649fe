use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ClinicResult;
use crate::models::{
    Appointment, AppointmentStatus, Clinic, ClinicCategory, ClinicFilter, Doctor,
    PurchasedService, Service, ServiceFilter,
};

/// Repository trait for the clinic side of the system
///
/// Updates take the full entity; callers load, mutate and hand it back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClinicRepository: Send + Sync {
    // Categories

    async fn create_category(&self, category: ClinicCategory) -> ClinicResult<ClinicCategory>;

    async fn get_category(&self, id: Uuid) -> ClinicResult<Option<ClinicCategory>>;

    /// Fetch the categories among `ids` that exist, in no particular order
    async fn find_categories(&self, ids: Vec<Uuid>) -> ClinicResult<Vec<ClinicCategory>>;

    async fn list_categories(&self) -> ClinicResult<Vec<ClinicCategory>>;

    async fn category_name_exists(&self, name: &str) -> ClinicResult<bool>;

    async fn update_category(&self, category: ClinicCategory) -> ClinicResult<ClinicCategory>;

    /// Whether any clinic or service still references the category
    async fn category_in_use(&self, id: Uuid) -> ClinicResult<bool>;

    async fn delete_category(&self, id: Uuid) -> ClinicResult<bool>;

    // Clinics

    async fn create_clinic(&self, clinic: Clinic) -> ClinicResult<Clinic>;

    async fn get_clinic(&self, id: Uuid) -> ClinicResult<Option<Clinic>>;

    async fn find_clinic_by_email(&self, email: &str) -> ClinicResult<Option<Clinic>>;

    async fn list_clinics(&self, filter: ClinicFilter) -> ClinicResult<Vec<Clinic>>;

    async fn update_clinic(&self, clinic: Clinic) -> ClinicResult<Clinic>;

    /// Delete a clinic together with its doctors and services
    async fn delete_clinic(&self, id: Uuid) -> ClinicResult<bool>;

    /// Append ledger entries for one order in a single write.
    ///
    /// Returns false when entries for `order_id` are already present.
    /// Fails with NotFound when the clinic does not exist.
    async fn record_purchases(
        &self,
        clinic_id: Uuid,
        order_id: Uuid,
        entries: Vec<PurchasedService>,
    ) -> ClinicResult<bool>;

    // Doctors

    async fn create_doctor(&self, doctor: Doctor) -> ClinicResult<Doctor>;

    async fn get_doctor(&self, id: Uuid) -> ClinicResult<Option<Doctor>>;

    async fn list_doctors(&self, clinic_id: Uuid) -> ClinicResult<Vec<Doctor>>;

    async fn update_doctor(&self, doctor: Doctor) -> ClinicResult<Doctor>;

    async fn delete_doctor(&self, id: Uuid) -> ClinicResult<bool>;

    // Services

    async fn create_service(&self, service: Service) -> ClinicResult<Service>;

    async fn get_service(&self, id: Uuid) -> ClinicResult<Option<Service>>;

    async fn list_services(&self, filter: ServiceFilter) -> ClinicResult<Vec<Service>>;

    async fn update_service(&self, service: Service) -> ClinicResult<Service>;

    async fn delete_service(&self, id: Uuid) -> ClinicResult<bool>;

    // Appointments

    async fn create_appointment(&self, appointment: Appointment) -> ClinicResult<Appointment>;

    async fn get_appointment(&self, id: Uuid) -> ClinicResult<Option<Appointment>>;

    async fn list_user_appointments(&self, user_id: Uuid) -> ClinicResult<Vec<Appointment>>;

    async fn list_clinic_appointments(&self, clinic_id: Uuid) -> ClinicResult<Vec<Appointment>>;

    async fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> ClinicResult<Option<Appointment>>;
}
