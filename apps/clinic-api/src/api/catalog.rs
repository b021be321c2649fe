//! Catalog routes: product categories, products, reviews, top products

use axum::Router;
use domain_catalog::{CatalogService, MongoCatalogRepository, handlers};
use tracing::info;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoCatalogRepository::new(&state.db);
    let service = CatalogService::new(repository, state.config.top_products_slots);
    handlers::router(service, state.jwt.clone())
}

pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoCatalogRepository::new(db)
        .ensure_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create catalog indexes: {}", e))?;
    info!("Catalog collection indexes created");
    Ok(())
}
