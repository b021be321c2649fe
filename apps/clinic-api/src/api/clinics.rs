//! Clinic routes: categories, clinics, doctors, services, appointments

use axum::Router;
use domain_clinics::{ClinicService, MongoClinicRepository, handlers};
use tracing::info;

use crate::state::AppState;

pub fn service(state: &AppState) -> ClinicService<MongoClinicRepository> {
    ClinicService::new(MongoClinicRepository::new(&state.db), state.jwt.clone())
}

pub fn router(state: &AppState) -> Router {
    handlers::router(service(state), state.jwt.clone())
}

pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoClinicRepository::new(db)
        .ensure_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create clinic indexes: {}", e))?;
    info!("Clinic collection indexes created");
    Ok(())
}
