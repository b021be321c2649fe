//! Clinic Service - business rules for clinics, their staff, services and bookings

use axum_helpers::{JwtAuth, JwtClaims, Role, hash_password, verify_password};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{
    Appointment, AppointmentStatus, Clinic, ClinicAuthResponse, ClinicCategory, ClinicFilter,
    ClinicLoginRequest, ClinicResponse, CreateAppointment, CreateClinic, CreateClinicCategory,
    CreateDoctor, CreateService, Doctor, PurchasedService, Service, ServiceFilter,
    ServiceResponse, UpdateClinic, UpdateClinicCategory, UpdateDoctor, UpdateService,
    dedup_ids,
};
use crate::repository::ClinicRepository;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validation<E: std::fmt::Display>(err: E) -> ClinicError {
    ClinicError::Validation(err.to_string())
}

pub struct ClinicService<R: ClinicRepository> {
    repository: Arc<R>,
    auth: JwtAuth,
}

impl<R: ClinicRepository> ClinicService<R> {
    pub fn new(repository: R, auth: JwtAuth) -> Self {
        Self {
            repository: Arc::new(repository),
            auth,
        }
    }

    /// Admins may act on any clinic; a clinic token only on itself
    fn ensure_clinic_access(actor: &JwtClaims, clinic_id: Uuid) -> ClinicResult<()> {
        if actor.is_admin() || actor.is_principal(Role::Clinic, clinic_id) {
            return Ok(());
        }
        Err(ClinicError::Forbidden(
            "Only an admin or the clinic itself may do this".to_string(),
        ))
    }

    fn hash(password: &str) -> ClinicResult<String> {
        hash_password(password).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ClinicError::Internal("Failed to hash password".to_string())
        })
    }

    async fn require_clinic(&self, id: Uuid) -> ClinicResult<Clinic> {
        self.repository
            .get_clinic(id)
            .await?
            .ok_or(ClinicError::clinic_not_found(id))
    }

    async fn require_category(&self, id: Uuid) -> ClinicResult<ClinicCategory> {
        self.repository
            .get_category(id)
            .await?
            .ok_or(ClinicError::category_not_found(id))
    }

    /// Load every category in `ids`, failing on the first unknown one
    async fn require_categories(&self, ids: &[Uuid]) -> ClinicResult<Vec<ClinicCategory>> {
        let found = self.repository.find_categories(ids.to_vec()).await?;
        let mut by_id: HashMap<Uuid, ClinicCategory> =
            found.into_iter().map(|c| (c.id, c)).collect();

        ids.iter()
            .map(|id| by_id.remove(id).ok_or(ClinicError::category_not_found(*id)))
            .collect()
    }

    async fn populate_clinic(&self, clinic: Clinic) -> ClinicResult<ClinicResponse> {
        let category = self.repository.get_category(clinic.category_id).await?;
        Ok(ClinicResponse::from_clinic(clinic, category))
    }

    async fn populate_service(&self, service: Service) -> ClinicResult<ServiceResponse> {
        let categories = self
            .repository
            .find_categories(service.category_ids.clone())
            .await?;
        // Keep the service's own ordering
        let mut by_id: HashMap<Uuid, ClinicCategory> =
            categories.into_iter().map(|c| (c.id, c)).collect();
        let categories = service
            .category_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        Ok(ServiceResponse {
            service,
            categories,
        })
    }

    // Categories

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> ClinicResult<Vec<ClinicCategory>> {
        self.repository.list_categories().await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: Uuid) -> ClinicResult<ClinicCategory> {
        self.require_category(id).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        input: CreateClinicCategory,
    ) -> ClinicResult<ClinicCategory> {
        input.validate().map_err(validation)?;

        let category = ClinicCategory::new(input);
        if self
            .repository
            .category_name_exists(&category.name)
            .await?
        {
            return Err(ClinicError::DuplicateCategoryName(category.name));
        }
        self.repository.create_category(category).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateClinicCategory,
    ) -> ClinicResult<ClinicCategory> {
        input.validate().map_err(validation)?;

        let mut category = self.require_category(id).await?;
        let previous_name = category.name.clone();
        category.apply_update(input);

        if category.name != previous_name
            && self
                .repository
                .category_name_exists(&category.name)
                .await?
        {
            return Err(ClinicError::DuplicateCategoryName(category.name));
        }
        self.repository.update_category(category).await
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> ClinicResult<()> {
        self.require_category(id).await?;
        if self.repository.category_in_use(id).await? {
            return Err(ClinicError::CategoryInUse(id));
        }
        if !self.repository.delete_category(id).await? {
            return Err(ClinicError::category_not_found(id));
        }
        Ok(())
    }

    // Clinics

    #[instrument(skip(self))]
    pub async fn list_clinics(&self, filter: ClinicFilter) -> ClinicResult<Vec<ClinicResponse>> {
        let clinics = self.repository.list_clinics(filter).await?;

        let category_ids = dedup_ids(clinics.iter().map(|c| c.category_id).collect());
        let categories: HashMap<Uuid, ClinicCategory> = self
            .repository
            .find_categories(category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(clinics
            .into_iter()
            .map(|clinic| {
                let category = categories.get(&clinic.category_id).cloned();
                ClinicResponse::from_clinic(clinic, category)
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_clinic(&self, id: Uuid) -> ClinicResult<ClinicResponse> {
        let clinic = self.require_clinic(id).await?;
        self.populate_clinic(clinic).await
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_clinic(&self, input: CreateClinic) -> ClinicResult<ClinicResponse> {
        input.validate().map_err(validation)?;

        let category = self.require_category(input.category_id).await?;
        let email = normalize_email(&input.email);
        if self.repository.find_clinic_by_email(&email).await?.is_some() {
            return Err(ClinicError::DuplicateEmail(email));
        }

        let password_hash = Self::hash(&input.password)?;
        let clinic = self
            .repository
            .create_clinic(Clinic::new(input, email, password_hash))
            .await?;
        Ok(ClinicResponse::from_clinic(clinic, Some(category)))
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.sub))]
    pub async fn update_clinic(
        &self,
        actor: &JwtClaims,
        id: Uuid,
        input: UpdateClinic,
    ) -> ClinicResult<ClinicResponse> {
        Self::ensure_clinic_access(actor, id)?;
        input.validate().map_err(validation)?;

        let mut clinic = self.require_clinic(id).await?;

        if let Some(category_id) = input.category_id {
            self.require_category(category_id).await?;
        }

        let email = match input.email.as_deref().map(normalize_email) {
            Some(email) if email != clinic.email => {
                if self.repository.find_clinic_by_email(&email).await?.is_some() {
                    return Err(ClinicError::DuplicateEmail(email));
                }
                Some(email)
            }
            _ => None,
        };
        let password_hash = input.password.as_deref().map(Self::hash).transpose()?;

        clinic.apply_update(input, email, password_hash);
        let clinic = self.repository.update_clinic(clinic).await?;
        self.populate_clinic(clinic).await
    }

    #[instrument(skip(self))]
    pub async fn delete_clinic(&self, id: Uuid) -> ClinicResult<()> {
        if !self.repository.delete_clinic(id).await? {
            return Err(ClinicError::clinic_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login_clinic(&self, input: ClinicLoginRequest) -> ClinicResult<ClinicAuthResponse> {
        let email = normalize_email(&input.email);
        let clinic = self
            .repository
            .find_clinic_by_email(&email)
            .await?
            .ok_or(ClinicError::InvalidCredentials)?;

        if !verify_password(&input.password, &clinic.password_hash) {
            tracing::info!(clinic_id = %clinic.id, "Rejected clinic login");
            return Err(ClinicError::InvalidCredentials);
        }

        let token = self
            .auth
            .create_token(clinic.id, &clinic.email, &clinic.name, Role::Clinic)
            .map_err(|e| {
                tracing::error!("Failed to create token: {:?}", e);
                ClinicError::Internal("Failed to create token".to_string())
            })?;

        Ok(ClinicAuthResponse {
            token,
            clinic: self.populate_clinic(clinic).await?,
        })
    }

    #[instrument(skip(self, actor), fields(actor = %actor.sub))]
    pub async fn purchased_services(
        &self,
        actor: &JwtClaims,
        id: Uuid,
    ) -> ClinicResult<Vec<PurchasedService>> {
        Self::ensure_clinic_access(actor, id)?;
        Ok(self.require_clinic(id).await?.purchased_services)
    }

    /// Append one order's purchases to a clinic ledger.
    ///
    /// Returns false if that order was already recorded for the clinic.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn record_purchases(
        &self,
        clinic_id: Uuid,
        order_id: Uuid,
        entries: Vec<PurchasedService>,
    ) -> ClinicResult<bool> {
        if entries.is_empty() {
            return Ok(false);
        }
        self.repository
            .record_purchases(clinic_id, order_id, entries)
            .await
    }

    // Doctors

    #[instrument(skip(self))]
    pub async fn list_doctors(&self, clinic_id: Uuid) -> ClinicResult<Vec<Doctor>> {
        self.require_clinic(clinic_id).await?;
        self.repository.list_doctors(clinic_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_doctor(&self, id: Uuid) -> ClinicResult<Doctor> {
        self.repository
            .get_doctor(id)
            .await?
            .ok_or(ClinicError::doctor_not_found(id))
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.sub, clinic_id = %input.clinic_id))]
    pub async fn create_doctor(&self, actor: &JwtClaims, input: CreateDoctor) -> ClinicResult<Doctor> {
        Self::ensure_clinic_access(actor, input.clinic_id)?;
        input.validate().map_err(validation)?;
        self.require_clinic(input.clinic_id).await?;

        self.repository.create_doctor(Doctor::new(input)).await
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.sub))]
    pub async fn update_doctor(
        &self,
        actor: &JwtClaims,
        id: Uuid,
        input: UpdateDoctor,
    ) -> ClinicResult<Doctor> {
        input.validate().map_err(validation)?;

        let mut doctor = self.get_doctor(id).await?;
        Self::ensure_clinic_access(actor, doctor.clinic_id)?;

        doctor.apply_update(input);
        self.repository.update_doctor(doctor).await
    }

    #[instrument(skip(self, actor), fields(actor = %actor.sub))]
    pub async fn delete_doctor(&self, actor: &JwtClaims, id: Uuid) -> ClinicResult<()> {
        let doctor = self.get_doctor(id).await?;
        Self::ensure_clinic_access(actor, doctor.clinic_id)?;

        if !self.repository.delete_doctor(id).await? {
            return Err(ClinicError::doctor_not_found(id));
        }
        Ok(())
    }

    // Services

    #[instrument(skip(self))]
    pub async fn list_services(&self, filter: ServiceFilter) -> ClinicResult<Vec<ServiceResponse>> {
        let services = self.repository.list_services(filter).await?;
        let mut populated = Vec::with_capacity(services.len());
        for service in services {
            populated.push(self.populate_service(service).await?);
        }
        Ok(populated)
    }

    /// Raw service lookup, used by bookings and order validation
    #[instrument(skip(self))]
    pub async fn find_service(&self, id: Uuid) -> ClinicResult<Service> {
        self.repository
            .get_service(id)
            .await?
            .ok_or(ClinicError::service_not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn get_service(&self, id: Uuid) -> ClinicResult<ServiceResponse> {
        let service = self.find_service(id).await?;
        self.populate_service(service).await
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.sub, clinic_id = %input.clinic_id))]
    pub async fn create_service(
        &self,
        actor: &JwtClaims,
        input: CreateService,
    ) -> ClinicResult<ServiceResponse> {
        Self::ensure_clinic_access(actor, input.clinic_id)?;
        input.validate().map_err(validation)?;
        self.require_clinic(input.clinic_id).await?;

        let service = Service::new(input);
        let categories = self.require_categories(&service.category_ids).await?;
        let service = self.repository.create_service(service).await?;
        Ok(ServiceResponse {
            service,
            categories,
        })
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.sub))]
    pub async fn update_service(
        &self,
        actor: &JwtClaims,
        id: Uuid,
        input: UpdateService,
    ) -> ClinicResult<ServiceResponse> {
        input.validate().map_err(validation)?;

        let mut service = self.find_service(id).await?;
        Self::ensure_clinic_access(actor, service.clinic_id)?;

        service.apply_update(input);
        let categories = self.require_categories(&service.category_ids).await?;
        let service = self.repository.update_service(service).await?;
        Ok(ServiceResponse {
            service,
            categories,
        })
    }

    #[instrument(skip(self, actor), fields(actor = %actor.sub))]
    pub async fn delete_service(&self, actor: &JwtClaims, id: Uuid) -> ClinicResult<()> {
        let service = self.find_service(id).await?;
        Self::ensure_clinic_access(actor, service.clinic_id)?;

        if !self.repository.delete_service(id).await? {
            return Err(ClinicError::service_not_found(id));
        }
        Ok(())
    }

    // Appointments

    #[instrument(skip(self, actor, input), fields(actor = %actor.sub, clinic_id = %input.clinic_id))]
    pub async fn book_appointment(
        &self,
        actor: &JwtClaims,
        input: CreateAppointment,
    ) -> ClinicResult<Appointment> {
        input.validate().map_err(validation)?;
        let user_id = actor
            .subject_id()
            .ok_or_else(|| ClinicError::Forbidden("Token subject is not a user id".to_string()))?;

        if input.scheduled_at <= Utc::now() {
            return Err(ClinicError::Validation(
                "scheduled_at must be in the future".to_string(),
            ));
        }

        self.require_clinic(input.clinic_id).await?;

        if let Some(doctor_id) = input.doctor_id {
            let doctor = self.get_doctor(doctor_id).await?;
            if doctor.clinic_id != input.clinic_id {
                return Err(ClinicError::Validation(format!(
                    "Doctor {} does not work at clinic {}",
                    doctor_id, input.clinic_id
                )));
            }
        }

        if let Some(service_id) = input.service_id {
            let service = self.find_service(service_id).await?;
            if service.clinic_id != input.clinic_id {
                return Err(ClinicError::Validation(format!(
                    "Service {} is not offered by clinic {}",
                    service_id, input.clinic_id
                )));
            }
        }

        self.repository
            .create_appointment(Appointment::new(user_id, input))
            .await
    }

    #[instrument(skip(self, actor), fields(actor = %actor.sub))]
    pub async fn my_appointments(&self, actor: &JwtClaims) -> ClinicResult<Vec<Appointment>> {
        match actor.subject_id() {
            Some(user_id) => self.repository.list_user_appointments(user_id).await,
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self, actor), fields(actor = %actor.sub))]
    pub async fn clinic_appointments(
        &self,
        actor: &JwtClaims,
        clinic_id: Uuid,
    ) -> ClinicResult<Vec<Appointment>> {
        Self::ensure_clinic_access(actor, clinic_id)?;
        self.require_clinic(clinic_id).await?;
        self.repository.list_clinic_appointments(clinic_id).await
    }

    #[instrument(skip(self, actor), fields(actor = %actor.sub))]
    pub async fn update_appointment_status(
        &self,
        actor: &JwtClaims,
        id: Uuid,
        status: AppointmentStatus,
    ) -> ClinicResult<Appointment> {
        let appointment = self.require_appointment(id).await?;
        Self::ensure_clinic_access(actor, appointment.clinic_id)?;
        self.transition(appointment, status).await
    }

    /// Cancel a booking on behalf of the user who made it
    #[instrument(skip(self, actor), fields(actor = %actor.sub))]
    pub async fn cancel_appointment(&self, actor: &JwtClaims, id: Uuid) -> ClinicResult<Appointment> {
        let appointment = self.require_appointment(id).await?;
        if !actor.is_principal(Role::User, appointment.user_id) {
            return Err(ClinicError::Forbidden(
                "Only the user who booked may cancel".to_string(),
            ));
        }
        self.transition(appointment, AppointmentStatus::Cancelled)
            .await
    }

    async fn require_appointment(&self, id: Uuid) -> ClinicResult<Appointment> {
        self.repository
            .get_appointment(id)
            .await?
            .ok_or(ClinicError::appointment_not_found(id))
    }

    async fn transition(
        &self,
        appointment: Appointment,
        status: AppointmentStatus,
    ) -> ClinicResult<Appointment> {
        if !appointment.status.can_transition_to(status) {
            return Err(ClinicError::InvalidTransition {
                from: appointment.status,
                to: status,
            });
        }
        self.repository
            .set_appointment_status(appointment.id, status)
            .await?
            .ok_or(ClinicError::appointment_not_found(appointment.id))
    }
}

impl<R: ClinicRepository> Clone for ClinicService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            auth: self.auth.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockClinicRepository;
    use axum_helpers::JwtConfig;
    use chrono::Duration;
    use mockall::predicate::eq;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("clinics-test-secret-long-enough-0123"))
    }

    fn claims(role: Role, id: Uuid) -> JwtClaims {
        let token = auth()
            .create_token(id, "someone@example.com", "Someone", role)
            .unwrap();
        auth().verify_token(&token).unwrap()
    }

    fn category() -> ClinicCategory {
        ClinicCategory::new(CreateClinicCategory {
            name: "Dental".to_string(),
            description: String::new(),
            image: None,
        })
    }

    fn clinic(category_id: Uuid) -> Clinic {
        Clinic::new(
            CreateClinic {
                name: "Smile".to_string(),
                email: "smile@example.com".to_string(),
                password: "secret123".to_string(),
                phone: "+380000000".to_string(),
                address: "1 Main St".to_string(),
                city: "Kyiv".to_string(),
                description: String::new(),
                images: vec!["https://img.example.com/1.png".to_string()],
                category_id,
            },
            "smile@example.com".to_string(),
            hash_password("secret123").unwrap(),
        )
    }

    fn create_clinic_input(category_id: Uuid) -> CreateClinic {
        CreateClinic {
            name: "Smile".to_string(),
            email: "Smile@Example.com".to_string(),
            password: "secret123".to_string(),
            phone: "+380000000".to_string(),
            address: "1 Main St".to_string(),
            city: "Kyiv".to_string(),
            description: String::new(),
            images: vec!["https://img.example.com/1.png".to_string()],
            category_id,
        }
    }

    fn appointment(user_id: Uuid, clinic_id: Uuid, status: AppointmentStatus) -> Appointment {
        let mut appointment = Appointment::new(
            user_id,
            CreateAppointment {
                clinic_id,
                doctor_id: None,
                service_id: None,
                scheduled_at: Utc::now() + Duration::days(1),
                notes: String::new(),
            },
        );
        appointment.status = status;
        appointment
    }

    #[tokio::test]
    async fn test_create_clinic_requires_existing_category() {
        let mut repo = MockClinicRepository::new();
        repo.expect_get_category().returning(|_| Ok(None));
        repo.expect_create_clinic().never();

        let service = ClinicService::new(repo, auth());
        let err = service
            .create_clinic(create_clinic_input(Uuid::now_v7()))
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::NotFound { entity: "Clinic category", .. }));
    }

    #[tokio::test]
    async fn test_create_clinic_normalizes_email_and_hashes_password() {
        let category = category();
        let category_id = category.id;
        let mut repo = MockClinicRepository::new();
        repo.expect_get_category()
            .returning(move |_| Ok(Some(category.clone())));
        repo.expect_find_clinic_by_email()
            .with(eq("smile@example.com"))
            .returning(|_| Ok(None));
        repo.expect_create_clinic().returning(|clinic| {
            assert_ne!(clinic.password_hash, "secret123");
            assert!(verify_password("secret123", &clinic.password_hash));
            Ok(clinic)
        });

        let service = ClinicService::new(repo, auth());
        let response = service
            .create_clinic(create_clinic_input(category_id))
            .await
            .unwrap();

        assert_eq!(response.email, "smile@example.com");
        assert_eq!(response.category.unwrap().id, category_id);
    }

    #[tokio::test]
    async fn test_create_clinic_rejects_duplicate_email() {
        let category = category();
        let category_id = category.id;
        let existing = clinic(category_id);
        let mut repo = MockClinicRepository::new();
        repo.expect_get_category()
            .returning(move |_| Ok(Some(category.clone())));
        repo.expect_find_clinic_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_create_clinic().never();

        let service = ClinicService::new(repo, auth());
        let err = service
            .create_clinic(create_clinic_input(category_id))
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_delete_category_in_use_conflicts() {
        let category = category();
        let id = category.id;
        let mut repo = MockClinicRepository::new();
        repo.expect_get_category()
            .returning(move |_| Ok(Some(category.clone())));
        repo.expect_category_in_use()
            .with(eq(id))
            .returning(|_| Ok(true));
        repo.expect_delete_category().never();

        let service = ClinicService::new(repo, auth());
        let err = service.delete_category(id).await.unwrap_err();
        assert!(matches!(err, ClinicError::CategoryInUse(in_use) if in_use == id));
    }

    #[tokio::test]
    async fn test_other_clinic_cannot_update() {
        let mut repo = MockClinicRepository::new();
        repo.expect_get_clinic().never();

        let service = ClinicService::new(repo, auth());
        let actor = claims(Role::Clinic, Uuid::now_v7());
        let err = service
            .update_clinic(&actor, Uuid::now_v7(), UpdateClinic::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_login_clinic_issues_clinic_token() {
        let stored = clinic(Uuid::now_v7());
        let clinic_id = stored.id;
        let mut repo = MockClinicRepository::new();
        repo.expect_find_clinic_by_email()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_get_category().returning(|_| Ok(None));

        let service = ClinicService::new(repo, auth());
        let response = service
            .login_clinic(ClinicLoginRequest {
                email: "SMILE@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let claims = auth().verify_token(&response.token).unwrap();
        assert_eq!(claims.role, Role::Clinic);
        assert_eq!(claims.subject_id(), Some(clinic_id));
    }

    #[tokio::test]
    async fn test_create_service_rejects_unknown_category() {
        let stored = clinic(Uuid::now_v7());
        let clinic_id = stored.id;
        let known = category();
        let known_id = known.id;
        let mut repo = MockClinicRepository::new();
        repo.expect_get_clinic()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_find_categories()
            .returning(move |_| Ok(vec![known.clone()]));
        repo.expect_create_service().never();

        let service = ClinicService::new(repo, auth());
        let actor = claims(Role::Clinic, clinic_id);
        let missing = Uuid::now_v7();
        let err = service
            .create_service(
                &actor,
                CreateService {
                    clinic_id,
                    name: "Cleaning".to_string(),
                    description: String::new(),
                    price: 40.0,
                    duration_minutes: 30,
                    category_ids: vec![known_id, missing],
                    images: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::NotFound { id, .. } if id == missing));
    }

    #[tokio::test]
    async fn test_book_appointment_rejects_past_time() {
        let mut repo = MockClinicRepository::new();
        repo.expect_create_appointment().never();

        let service = ClinicService::new(repo, auth());
        let actor = claims(Role::User, Uuid::now_v7());
        let err = service
            .book_appointment(
                &actor,
                CreateAppointment {
                    clinic_id: Uuid::now_v7(),
                    doctor_id: None,
                    service_id: None,
                    scheduled_at: Utc::now() - Duration::hours(1),
                    notes: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::Validation(_)));
    }

    #[tokio::test]
    async fn test_book_appointment_rejects_doctor_from_other_clinic() {
        let stored = clinic(Uuid::now_v7());
        let clinic_id = stored.id;
        let doctor = Doctor::new(CreateDoctor {
            clinic_id: Uuid::now_v7(),
            name: "Dr. House".to_string(),
            specialization: "Diagnostics".to_string(),
            experience_years: 20,
            image: None,
            bio: String::new(),
        });
        let doctor_id = doctor.id;
        let mut repo = MockClinicRepository::new();
        repo.expect_get_clinic()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_get_doctor()
            .returning(move |_| Ok(Some(doctor.clone())));
        repo.expect_create_appointment().never();

        let service = ClinicService::new(repo, auth());
        let actor = claims(Role::User, Uuid::now_v7());
        let err = service
            .book_appointment(
                &actor,
                CreateAppointment {
                    clinic_id,
                    doctor_id: Some(doctor_id),
                    service_id: None,
                    scheduled_at: Utc::now() + Duration::days(2),
                    notes: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::Validation(_)));
    }

    #[tokio::test]
    async fn test_status_transition_rules() {
        let clinic_id = Uuid::now_v7();
        let stored = appointment(Uuid::now_v7(), clinic_id, AppointmentStatus::Cancelled);
        let id = stored.id;
        let mut repo = MockClinicRepository::new();
        repo.expect_get_appointment()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_set_appointment_status().never();

        let service = ClinicService::new(repo, auth());
        let actor = claims(Role::Clinic, clinic_id);
        let err = service
            .update_appointment_status(&actor, id, AppointmentStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClinicError::InvalidTransition {
                from: AppointmentStatus::Cancelled,
                to: AppointmentStatus::Confirmed
            }
        ));
    }

    #[tokio::test]
    async fn test_cancel_only_by_owner() {
        let owner = Uuid::now_v7();
        let stored = appointment(owner, Uuid::now_v7(), AppointmentStatus::Pending);
        let id = stored.id;
        let mut repo = MockClinicRepository::new();
        let returned = stored.clone();
        repo.expect_get_appointment()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_set_appointment_status()
            .with(eq(id), eq(AppointmentStatus::Cancelled))
            .times(1)
            .returning(move |_, status| {
                let mut updated = returned.clone();
                updated.status = status;
                Ok(Some(updated))
            });

        let service = ClinicService::new(repo, auth());

        let stranger = claims(Role::User, Uuid::now_v7());
        let err = service.cancel_appointment(&stranger, id).await.unwrap_err();
        assert!(matches!(err, ClinicError::Forbidden(_)));

        let cancelled = service
            .cancel_appointment(&claims(Role::User, owner), id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_record_purchases_skips_empty_batches() {
        let mut repo = MockClinicRepository::new();
        repo.expect_record_purchases().never();

        let service = ClinicService::new(repo, auth());
        let recorded = service
            .record_purchases(Uuid::now_v7(), Uuid::now_v7(), vec![])
            .await
            .unwrap();
        assert!(!recorded);
    }
}
