use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

fn default_limit() -> i64 {
    50
}

// ---------------------------------------------------------------------------
// Clinic categories
// ---------------------------------------------------------------------------

/// Category shared by clinics and their services (e.g. "Dental", "Dermatology")
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClinicCategory {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClinicCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(url)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClinicCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(url)]
    pub image: Option<String>,
}

impl ClinicCategory {
    pub fn new(input: CreateClinicCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            description: input.description,
            image: input.image,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateClinicCategory) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Clinics
// ---------------------------------------------------------------------------

/// One line of a clinic's purchased-service ledger.
///
/// Unique per `(order_id, service_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PurchasedService {
    pub order_id: Uuid,
    pub service_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub purchased_at: DateTime<Utc>,
}

/// Clinic entity as stored in the `clinics` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    /// Lowercased, unique; also the clinic's login
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub description: String,
    /// Image URLs, never empty
    pub images: Vec<String>,
    pub category_id: Uuid,
    #[serde(default)]
    pub purchased_services: Vec<PurchasedService>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Clinic read model: no credentials, no ledger, category populated when known
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClinicResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub description: String,
    pub images: Vec<String>,
    pub category_id: Uuid,
    pub category: Option<ClinicCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClinicResponse {
    pub fn from_clinic(clinic: Clinic, category: Option<ClinicCategory>) -> Self {
        Self {
            id: clinic.id,
            name: clinic.name,
            email: clinic.email,
            phone: clinic.phone,
            address: clinic.address,
            city: clinic.city,
            description: clinic.description,
            images: clinic.images,
            category_id: clinic.category_id,
            category,
            created_at: clinic.created_at,
            updated_at: clinic.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClinic {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(min = 3, max = 32))]
    pub phone: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[validate(length(min = 1, message = "at least one image is required"))]
    pub images: Vec<String>,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClinic {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "at least one image is required"))]
    pub images: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ClinicFilter {
    pub category_id: Option<Uuid>,
    pub city: Option<String>,
    /// Search in name and description
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ClinicLoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClinicAuthResponse {
    pub token: String,
    pub clinic: ClinicResponse,
}

impl Clinic {
    /// Build a clinic; email normalization and hashing happen in the service
    pub fn new(input: CreateClinic, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            email,
            password_hash,
            phone: input.phone,
            address: input.address,
            city: input.city.trim().to_string(),
            description: input.description,
            images: input.images,
            category_id: input.category_id,
            purchased_services: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates; `email` and `password_hash` arrive already normalized/hashed
    pub fn apply_update(
        &mut self,
        update: UpdateClinic,
        email: Option<String>,
        password_hash: Option<String>,
    ) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(hash) = password_hash {
            self.password_hash = hash;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(city) = update.city {
            self.city = city.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Doctors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Doctor {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub specialization: String,
    pub experience_years: u32,
    pub image: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDoctor {
    pub clinic_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub specialization: String,
    #[serde(default)]
    #[validate(range(max = 80))]
    pub experience_years: u32,
    #[validate(url)]
    pub image: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub bio: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDoctor {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub specialization: Option<String>,
    #[validate(range(max = 80))]
    pub experience_years: Option<u32>,
    #[validate(url)]
    pub image: Option<String>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
}

impl Doctor {
    pub fn new(input: CreateDoctor) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            clinic_id: input.clinic_id,
            name: input.name.trim().to_string(),
            specialization: input.specialization,
            experience_years: input.experience_years,
            image: input.image,
            bio: input.bio,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateDoctor) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(specialization) = update.specialization {
            self.specialization = specialization;
        }
        if let Some(years) = update.experience_years {
            self.experience_years = years;
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        if let Some(bio) = update.bio {
            self.bio = bio;
        }
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Billable offering of a clinic, purchasable through orders
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Service {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub duration_minutes: u32,
    /// Clinic categories this service is listed under
    pub category_ids: Vec<Uuid>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Service read model with categories populated
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceResponse {
    #[serde(flatten)]
    pub service: Service,
    pub categories: Vec<ClinicCategory>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateService {
    pub clinic_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: u32,
    #[validate(length(min = 1, message = "at least one category is required"))]
    pub category_ids: Vec<Uuid>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateService {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<u32>,
    #[validate(length(min = 1, message = "at least one category is required"))]
    pub category_ids: Option<Vec<Uuid>>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ServiceFilter {
    pub clinic_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Search in name and description
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

impl Service {
    pub fn new(input: CreateService) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            clinic_id: input.clinic_id,
            name: input.name.trim().to_string(),
            description: input.description,
            price: input.price,
            duration_minutes: input.duration_minutes,
            category_ids: dedup_ids(input.category_ids),
            images: input.images,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateService) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(duration) = update.duration_minutes {
            self.duration_minutes = duration;
        }
        if let Some(category_ids) = update.category_ids {
            self.category_ids = dedup_ids(category_ids);
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        self.updated_at = Utc::now();
    }
}

/// Drop repeated ids while keeping first-seen order
pub fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// pending → confirmed | cancelled, confirmed → completed | cancelled
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub clinic_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAppointment {
    pub clinic_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateAppointmentStatus {
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn new(user_id: Uuid, input: CreateAppointment) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            clinic_id: input.clinic_id,
            doctor_id: input.doctor_id,
            service_id: input.service_id,
            scheduled_at: input.scheduled_at,
            status: AppointmentStatus::Pending,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }
}
