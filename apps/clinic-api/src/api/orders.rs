//! Order routes; clinic ledgers are written through the clinic service

use axum::Router;
use domain_orders::{MongoOrderRepository, OrderService, handlers};
use tracing::info;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoOrderRepository::new(&state.db);
    let service = OrderService::new(repository, super::clinics::service(state));
    handlers::router(service, state.jwt.clone())
}

pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoOrderRepository::new(db)
        .ensure_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create order indexes: {}", e))?;
    info!("Order collection indexes created");
    Ok(())
}
