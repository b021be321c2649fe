//! MongoDB implementation of ClinicRepository

use async_trait::async_trait;
use database::mongodb::{
    id_filter, is_duplicate_key_error, now_bson, regex_escape, text_search, to_stored_bson,
    to_stored_document, uuid_bson,
};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ClinicError, ClinicResult};
use crate::models::{
    Appointment, AppointmentStatus, Clinic, ClinicCategory, ClinicFilter, Doctor,
    PurchasedService, Service, ServiceFilter,
};
use crate::repository::ClinicRepository;

fn search_clause(search: &str) -> Vec<Document> {
    text_search(&["name", "description"], search)
}

/// MongoDB implementation of the ClinicRepository
pub struct MongoClinicRepository {
    categories: Collection<ClinicCategory>,
    clinics: Collection<Clinic>,
    doctors: Collection<Doctor>,
    services: Collection<Service>,
    appointments: Collection<Appointment>,
}

impl MongoClinicRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            categories: db.collection("clinic_categories"),
            clinics: db.collection("clinics"),
            doctors: db.collection("doctors"),
            services: db.collection("services"),
            appointments: db.collection("appointments"),
        }
    }

    /// Unique keys plus the lookups every list endpoint filters on
    pub async fn ensure_indexes(&self) -> ClinicResult<()> {
        let unique = |keys: Document| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build()
        };
        let plain = |keys: Document| IndexModel::builder().keys(keys).build();

        self.categories.create_index(unique(doc! { "name": 1 })).await?;
        self.clinics.create_index(unique(doc! { "email": 1 })).await?;
        self.clinics
            .create_indexes([plain(doc! { "category_id": 1 }), plain(doc! { "city": 1 })])
            .await?;
        self.doctors.create_index(plain(doc! { "clinic_id": 1 })).await?;
        self.services
            .create_indexes([
                plain(doc! { "clinic_id": 1 }),
                plain(doc! { "category_ids": 1 }),
            ])
            .await?;
        self.appointments
            .create_indexes([
                plain(doc! { "user_id": 1, "scheduled_at": -1 }),
                plain(doc! { "clinic_id": 1, "scheduled_at": -1 }),
            ])
            .await?;

        tracing::info!("Clinic indexes ensured");
        Ok(())
    }

    /// Build a MongoDB filter document from ClinicFilter
    fn build_clinic_filter(filter: &ClinicFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref category_id) = filter.category_id {
            doc.insert("category_id", uuid_bson(*category_id));
        }

        if let Some(ref city) = filter.city {
            doc.insert(
                "city",
                doc! { "$regex": format!("^{}$", regex_escape(city.trim())), "$options": "i" },
            );
        }

        if let Some(ref search) = filter.search {
            doc.insert("$or", search_clause(search));
        }

        doc
    }

    /// Build a MongoDB filter document from ServiceFilter
    fn build_service_filter(filter: &ServiceFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref clinic_id) = filter.clinic_id {
            doc.insert("clinic_id", uuid_bson(*clinic_id));
        }

        if let Some(ref category_id) = filter.category_id {
            // Array field: equality matches any element
            doc.insert("category_ids", uuid_bson(*category_id));
        }

        if let Some(ref search) = filter.search {
            doc.insert("$or", search_clause(search));
        }

        doc
    }

    fn list_options(limit: i64, offset: u64) -> FindOptions {
        FindOptions::builder()
            .limit(limit)
            .skip(offset)
            .sort(doc! { "created_at": -1 })
            .build()
    }
}

#[async_trait]
impl ClinicRepository for MongoClinicRepository {
    #[instrument(skip(self, category), fields(name = %category.name))]
    async fn create_category(&self, category: ClinicCategory) -> ClinicResult<ClinicCategory> {
        self.categories.insert_one(&category).await.map_err(|e| {
            if is_duplicate_key_error(&e) {
                ClinicError::DuplicateCategoryName(category.name.clone())
            } else {
                e.into()
            }
        })?;

        tracing::info!(category_id = %category.id, "Clinic category created successfully");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn get_category(&self, id: Uuid) -> ClinicResult<Option<ClinicCategory>> {
        Ok(self.categories.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn find_categories(&self, ids: Vec<Uuid>) -> ClinicResult<Vec<ClinicCategory>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Bson> = ids.into_iter().map(uuid_bson).collect();
        let cursor = self.categories.find(doc! { "_id": { "$in": ids } }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> ClinicResult<Vec<ClinicCategory>> {
        let cursor = self.categories.find(doc! {}).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn category_name_exists(&self, name: &str) -> ClinicResult<bool> {
        let count = self.categories.count_documents(doc! { "name": name }).await?;
        Ok(count > 0)
    }

    #[instrument(skip(self, category), fields(category_id = %category.id))]
    async fn update_category(&self, category: ClinicCategory) -> ClinicResult<ClinicCategory> {
        let result = self
            .categories
            .replace_one(id_filter(category.id), &category)
            .await
            .map_err(|e| {
                if is_duplicate_key_error(&e) {
                    ClinicError::DuplicateCategoryName(category.name.clone())
                } else {
                    e.into()
                }
            })?;

        if result.matched_count == 0 {
            return Err(ClinicError::category_not_found(category.id));
        }

        tracing::info!(category_id = %category.id, "Clinic category updated successfully");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn category_in_use(&self, id: Uuid) -> ClinicResult<bool> {
        let clinics = self
            .clinics
            .count_documents(doc! { "category_id": uuid_bson(id) })
            .await?;
        if clinics > 0 {
            return Ok(true);
        }
        let services = self
            .services
            .count_documents(doc! { "category_ids": uuid_bson(id) })
            .await?;
        Ok(services > 0)
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: Uuid) -> ClinicResult<bool> {
        let result = self.categories.delete_one(id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(category_id = %id, "Clinic category deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, clinic), fields(email = %clinic.email))]
    async fn create_clinic(&self, clinic: Clinic) -> ClinicResult<Clinic> {
        self.clinics.insert_one(&clinic).await.map_err(|e| {
            if is_duplicate_key_error(&e) {
                ClinicError::DuplicateEmail(clinic.email.clone())
            } else {
                e.into()
            }
        })?;

        tracing::info!(clinic_id = %clinic.id, "Clinic created successfully");
        Ok(clinic)
    }

    #[instrument(skip(self))]
    async fn get_clinic(&self, id: Uuid) -> ClinicResult<Option<Clinic>> {
        Ok(self.clinics.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn find_clinic_by_email(&self, email: &str) -> ClinicResult<Option<Clinic>> {
        Ok(self.clinics.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self))]
    async fn list_clinics(&self, filter: ClinicFilter) -> ClinicResult<Vec<Clinic>> {
        let cursor = self
            .clinics
            .find(Self::build_clinic_filter(&filter))
            .with_options(Self::list_options(filter.limit, filter.offset))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, clinic), fields(clinic_id = %clinic.id))]
    async fn update_clinic(&self, clinic: Clinic) -> ClinicResult<Clinic> {
        // The ledger is only ever appended through record_purchases
        let mut fields = to_stored_document(&clinic)?;
        fields.remove("_id");
        fields.remove("purchased_services");

        let result = self
            .clinics
            .update_one(id_filter(clinic.id), doc! { "$set": fields })
            .await
            .map_err(|e| {
                if is_duplicate_key_error(&e) {
                    ClinicError::DuplicateEmail(clinic.email.clone())
                } else {
                    e.into()
                }
            })?;

        if result.matched_count == 0 {
            return Err(ClinicError::clinic_not_found(clinic.id));
        }

        tracing::info!(clinic_id = %clinic.id, "Clinic updated successfully");
        Ok(clinic)
    }

    #[instrument(skip(self))]
    async fn delete_clinic(&self, id: Uuid) -> ClinicResult<bool> {
        let result = self.clinics.delete_one(id_filter(id)).await?;
        if result.deleted_count == 0 {
            return Ok(false);
        }

        let owned = doc! { "clinic_id": uuid_bson(id) };
        let doctors = self.doctors.delete_many(owned.clone()).await?;
        let services = self.services.delete_many(owned).await?;

        tracing::info!(
            clinic_id = %id,
            doctors = doctors.deleted_count,
            services = services.deleted_count,
            "Clinic deleted successfully"
        );
        Ok(true)
    }

    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    async fn record_purchases(
        &self,
        clinic_id: Uuid,
        order_id: Uuid,
        entries: Vec<PurchasedService>,
    ) -> ClinicResult<bool> {
        let entries = to_stored_bson(&entries)?;

        // Guarding on order_id keeps the single $push idempotent
        let filter = doc! {
            "_id": uuid_bson(clinic_id),
            "purchased_services.order_id": { "$ne": uuid_bson(order_id) },
        };
        let update = doc! {
            "$push": { "purchased_services": { "$each": entries } },
            "$set": { "updated_at": now_bson() },
        };

        let result = self.clinics.update_one(filter, update).await?;
        if result.modified_count > 0 {
            tracing::info!(clinic_id = %clinic_id, order_id = %order_id, "Purchased services recorded");
            return Ok(true);
        }

        if self.get_clinic(clinic_id).await?.is_none() {
            return Err(ClinicError::clinic_not_found(clinic_id));
        }

        tracing::debug!(clinic_id = %clinic_id, order_id = %order_id, "Purchases already recorded");
        Ok(false)
    }

    #[instrument(skip(self, doctor), fields(clinic_id = %doctor.clinic_id))]
    async fn create_doctor(&self, doctor: Doctor) -> ClinicResult<Doctor> {
        self.doctors.insert_one(&doctor).await?;
        tracing::info!(doctor_id = %doctor.id, "Doctor created successfully");
        Ok(doctor)
    }

    #[instrument(skip(self))]
    async fn get_doctor(&self, id: Uuid) -> ClinicResult<Option<Doctor>> {
        Ok(self.doctors.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_doctors(&self, clinic_id: Uuid) -> ClinicResult<Vec<Doctor>> {
        let cursor = self
            .doctors
            .find(doc! { "clinic_id": uuid_bson(clinic_id) })
            .sort(doc! { "name": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, doctor), fields(doctor_id = %doctor.id))]
    async fn update_doctor(&self, doctor: Doctor) -> ClinicResult<Doctor> {
        let result = self.doctors.replace_one(id_filter(doctor.id), &doctor).await?;
        if result.matched_count == 0 {
            return Err(ClinicError::doctor_not_found(doctor.id));
        }
        tracing::info!(doctor_id = %doctor.id, "Doctor updated successfully");
        Ok(doctor)
    }

    #[instrument(skip(self))]
    async fn delete_doctor(&self, id: Uuid) -> ClinicResult<bool> {
        let result = self.doctors.delete_one(id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(doctor_id = %id, "Doctor deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, service), fields(clinic_id = %service.clinic_id))]
    async fn create_service(&self, service: Service) -> ClinicResult<Service> {
        self.services.insert_one(&service).await?;
        tracing::info!(service_id = %service.id, "Service created successfully");
        Ok(service)
    }

    #[instrument(skip(self))]
    async fn get_service(&self, id: Uuid) -> ClinicResult<Option<Service>> {
        Ok(self.services.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_services(&self, filter: ServiceFilter) -> ClinicResult<Vec<Service>> {
        let cursor = self
            .services
            .find(Self::build_service_filter(&filter))
            .with_options(Self::list_options(filter.limit, filter.offset))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, service), fields(service_id = %service.id))]
    async fn update_service(&self, service: Service) -> ClinicResult<Service> {
        let result = self
            .services
            .replace_one(id_filter(service.id), &service)
            .await?;
        if result.matched_count == 0 {
            return Err(ClinicError::service_not_found(service.id));
        }
        tracing::info!(service_id = %service.id, "Service updated successfully");
        Ok(service)
    }

    #[instrument(skip(self))]
    async fn delete_service(&self, id: Uuid) -> ClinicResult<bool> {
        let result = self.services.delete_one(id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(service_id = %id, "Service deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, appointment), fields(clinic_id = %appointment.clinic_id))]
    async fn create_appointment(&self, appointment: Appointment) -> ClinicResult<Appointment> {
        self.appointments.insert_one(&appointment).await?;
        tracing::info!(appointment_id = %appointment.id, "Appointment booked successfully");
        Ok(appointment)
    }

    #[instrument(skip(self))]
    async fn get_appointment(&self, id: Uuid) -> ClinicResult<Option<Appointment>> {
        Ok(self.appointments.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_user_appointments(&self, user_id: Uuid) -> ClinicResult<Vec<Appointment>> {
        let cursor = self
            .appointments
            .find(doc! { "user_id": uuid_bson(user_id) })
            .sort(doc! { "scheduled_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list_clinic_appointments(&self, clinic_id: Uuid) -> ClinicResult<Vec<Appointment>> {
        let cursor = self
            .appointments
            .find(doc! { "clinic_id": uuid_bson(clinic_id) })
            .sort(doc! { "scheduled_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> ClinicResult<Option<Appointment>> {
        let updated = self
            .appointments
            .find_one_and_update(
                id_filter(id),
                doc! { "$set": {
                    "status": status.to_string(),
                    "updated_at": now_bson(),
                } },
            )
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!(appointment_id = %id, status = %status, "Appointment status updated");
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_clinic_filter_empty() {
        let doc = MongoClinicRepository::build_clinic_filter(&ClinicFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_clinic_filter_with_all_fields() {
        let filter = ClinicFilter {
            category_id: Some(Uuid::now_v7()),
            city: Some("Kyiv".to_string()),
            search: Some("smile".to_string()),
            ..Default::default()
        };
        let doc = MongoClinicRepository::build_clinic_filter(&filter);
        assert!(doc.contains_key("category_id"));
        assert!(doc.contains_key("city"));
        assert!(doc.contains_key("$or"));
    }

    #[test]
    fn test_city_filter_is_anchored_and_escaped() {
        let filter = ClinicFilter {
            city: Some("St. Louis".to_string()),
            ..Default::default()
        };
        let doc = MongoClinicRepository::build_clinic_filter(&filter);
        let city = doc.get_document("city").unwrap();
        assert_eq!(city.get_str("$regex").unwrap(), "^St\\. Louis$");
    }

    #[test]
    fn test_build_service_filter_by_category() {
        let filter = ServiceFilter {
            category_id: Some(Uuid::now_v7()),
            ..Default::default()
        };
        let doc = MongoClinicRepository::build_service_filter(&filter);
        assert!(doc.contains_key("category_ids"));
        assert!(!doc.contains_key("clinic_id"));
    }

    #[test]
    fn test_search_is_matched_literally() {
        let filter = ClinicFilter {
            search: Some("smile (kids)*".to_string()),
            ..Default::default()
        };
        let doc = MongoClinicRepository::build_clinic_filter(&filter);
        let clauses = doc.get_array("$or").unwrap();
        let name = clauses[0].as_document().unwrap().get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), "smile \\(kids\\)\\*");
    }

    #[test]
    fn test_category_filter_matches_stored_encoding() {
        let category_id = Uuid::now_v7();
        let filter = ServiceFilter {
            category_id: Some(category_id),
            ..Default::default()
        };
        let doc = MongoClinicRepository::build_service_filter(&filter);
        assert_eq!(doc.get("category_ids"), Some(&uuid_bson(category_id)));
        assert!(matches!(doc.get("category_ids"), Some(Bson::Binary(_))));
    }

    async fn test_repo() -> (Database, MongoClinicRepository) {
        let uri =
            std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(&uri).await.unwrap();
        let db = client.database(&format!("clinics_test_{}", Uuid::now_v7().simple()));
        let repo = MongoClinicRepository::new(&db);
        (db, repo)
    }

    fn sample_clinic() -> Clinic {
        use crate::models::CreateClinic;

        let email = format!("{}@clinic.example.com", Uuid::now_v7().simple());
        Clinic::new(
            CreateClinic {
                name: "Bright Smile".to_string(),
                email: email.clone(),
                password: "secret123".to_string(),
                phone: "+380441234567".to_string(),
                address: "1 Main St".to_string(),
                city: "Kyiv".to_string(),
                description: String::new(),
                images: vec!["https://img.example.com/clinic.png".to_string()],
                category_id: Uuid::now_v7(),
            },
            email,
            "hash".to_string(),
        )
    }

    fn purchase(order_id: Uuid, service_id: Uuid) -> PurchasedService {
        PurchasedService {
            order_id,
            service_id,
            user_id: Uuid::now_v7(),
            name: "Whitening".to_string(),
            price: 120.0,
            quantity: 1,
            purchased_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_record_purchases_is_idempotent_per_order() {
        let (db, repo) = test_repo().await;
        let clinic = repo.create_clinic(sample_clinic()).await.unwrap();
        let order_id = Uuid::now_v7();
        let entries = vec![purchase(order_id, Uuid::now_v7())];

        assert!(repo.record_purchases(clinic.id, order_id, entries.clone()).await.unwrap());
        assert!(!repo.record_purchases(clinic.id, order_id, entries).await.unwrap());

        let stored = repo.get_clinic(clinic.id).await.unwrap().unwrap();
        assert_eq!(stored.purchased_services.len(), 1);
        assert_eq!(stored.purchased_services[0].order_id, order_id);

        // A second order still lands
        let next = Uuid::now_v7();
        assert!(
            repo.record_purchases(clinic.id, next, vec![purchase(next, Uuid::now_v7())])
                .await
                .unwrap()
        );

        let missing = repo
            .record_purchases(Uuid::now_v7(), order_id, vec![purchase(order_id, Uuid::now_v7())])
            .await
            .unwrap_err();
        assert!(matches!(missing, ClinicError::NotFound { .. }));

        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_delete_clinic_removes_doctors_and_services() {
        use crate::models::{CreateDoctor, CreateService};

        let (db, repo) = test_repo().await;
        let clinic = repo.create_clinic(sample_clinic()).await.unwrap();
        let doctor = repo
            .create_doctor(Doctor::new(CreateDoctor {
                clinic_id: clinic.id,
                name: "Dr. Lee".to_string(),
                specialization: "Orthodontics".to_string(),
                experience_years: 7,
                image: None,
                bio: String::new(),
            }))
            .await
            .unwrap();
        let service = repo
            .create_service(Service::new(CreateService {
                clinic_id: clinic.id,
                name: "Whitening".to_string(),
                description: String::new(),
                price: 120.0,
                duration_minutes: 60,
                category_ids: vec![clinic.category_id],
                images: Vec::new(),
            }))
            .await
            .unwrap();

        assert!(repo.delete_clinic(clinic.id).await.unwrap());
        assert!(repo.get_doctor(doctor.id).await.unwrap().is_none());
        assert!(repo.get_service(service.id).await.unwrap().is_none());

        db.drop().await.unwrap();
    }
}
